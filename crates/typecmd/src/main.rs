use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use typecmd::app::exit_on_config_error;
use typecmd::convert::parse;
use typecmd::{
    Application, Command, ConfigError, ConversionError, EXIT_SUCCESS, Locale, Properties,
    ResourceBundle, TelemetryConfig, TypeRegistry, init_tracing,
};
use typecmd_common::{PopResult, Queue, ThreadPool, TimeProbe};

const PARTIAL_RESULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `x:y`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

impl Point {
    fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// `a:b`
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pair(i32, i32);

fn split_colon<'a>(raw: &'a str, type_name: &str) -> Result<(&'a str, &'a str), ConversionError> {
    raw.split_once(':')
        .ok_or_else(|| ConversionError::invalid_format(raw, type_name))
}

fn types() -> Result<TypeRegistry, ConfigError> {
    let mut types = TypeRegistry::with_primitives();
    types.register_type("point", |raw: &str| {
        let (x, y) = split_colon(raw, "point")?;
        Ok(Point {
            x: parse(x)?,
            y: parse(y)?,
        })
    })?;
    types.register_type("pair", |raw: &str| {
        let (a, b) = split_colon(raw, "pair")?;
        Ok(Pair(parse(a)?, parse(b)?))
    })?;
    Ok(types)
}

fn commands(types: &TypeRegistry) -> Result<Vec<Command>, ConfigError> {
    Ok(vec![
        Command::builder("add_int")
            .param::<i32>()
            .param::<i32>()
            .action(|args, out| {
                let sum = i64::from(args.get::<i32>(0)?) + i64::from(args.get::<i32>(1)?);
                writeln!(out, "{}", sum)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("add")
            .param::<f64>()
            .param::<f64>()
            .action(|args, out| {
                writeln!(out, "{}", args.get::<f64>(0)? + args.get::<f64>(1)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("divide")
            .param::<i32>()
            .param::<i32>()
            .description("Integer division. Division by zero is not checked.")
            .action(|args, out| {
                writeln!(out, "{}", args.get::<i32>(0)? / args.get::<i32>(1)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("echo")
            .labeled::<String>("text")
            .action(|args, out| {
                writeln!(out, "{}", args.get::<String>(0)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("echo")
            .param::<String>()
            .param::<String>()
            .action(|args, out| {
                writeln!(out, "{} {}", args.get::<String>(0)?, args.get::<String>(1)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("pair")
            .param::<Pair>()
            .action(|args, out| {
                let Pair(a, b) = args.get(0)?;
                writeln!(out, "pair( {}, {} )", a, b)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("distance")
            .labeled::<Point>("from")
            .labeled::<Point>("to")
            .description("Euclidean distance between two points.")
            .action(|args, out| {
                let from: Point = args.get(0)?;
                let to: Point = args.get(1)?;
                writeln!(out, "{}", from.distance(&to))?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("move_x")
            .param::<Point>()
            .labeled::<f32>("dx")
            .action(|args, out| {
                let mut point: Point = args.get(0)?;
                point.x += f64::from(args.get::<f32>(1)?);
                writeln!(out, "{}", point)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("hex")
            .param::<u64>()
            .action(|args, out| {
                writeln!(out, "{:#x}", args.get::<u64>(0)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("fail")
            .labeled::<String>("message")
            .description("Always fails with the given message.")
            .action(|args, _| Err(args.get::<String>(0)?.into()))
            .build(types)?,
        Command::builder("exit")
            .labeled::<i32>("code")
            .action(|args, _| Ok(args.get::<i32>(0)?))
            .build(types)?,
        Command::builder("prop")
            .labeled::<String>("file")
            .labeled::<String>("key")
            .description("Print one entry of a property file.")
            .action(|args, out| {
                let file = args.get::<String>(0)?;
                let key = args.get::<String>(1)?;
                let props = Properties::open(&file)?;
                if !props.file_found() {
                    return Err(format!("File not found: {}", file).into());
                }
                if !props.contains(&key) {
                    return Err(format!("Key not found: {}", key).into());
                }
                writeln!(out, "{}", props.get(&key, ""))?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("translate")
            .labeled::<String>("dir")
            .labeled::<String>("bundle")
            .labeled::<String>("locale")
            .labeled::<String>("key")
            .description("Look a key up in a resource bundle.")
            .action(|args, out| {
                let bundle = ResourceBundle::new(&args.get::<String>(1)?, args.get::<String>(0)?)?;
                let locale = Locale::parse(&args.get::<String>(2)?)?;
                writeln!(out, "{}", bundle.translate(&locale, &args.get::<String>(3)?))?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
        Command::builder("parallel_sum")
            .labeled::<u32>("n")
            .description("Sum 1..=n on a worker pool.")
            .action(|args, out| {
                let n = args.get::<u32>(0)?;
                writeln!(out, "{}", parallel_sum(n)?)?;
                Ok(EXIT_SUCCESS)
            })
            .build(types)?,
    ])
}

fn parallel_sum(n: u32) -> Result<u64, typecmd::error::BoxError> {
    let probe = TimeProbe::new("parallel_sum");
    let pool = ThreadPool::with_available_parallelism()?;
    let results = Arc::new(Queue::<u64>::new());

    let n = u64::from(n);
    let chunk = n.div_ceil(pool.size() as u64).max(1);
    let mut pending = 0;
    let mut start = 1;
    while start <= n {
        let end = (start + chunk - 1).min(n);
        let results = Arc::clone(&results);
        pool.execute(move || {
            let _ = results.push((start..=end).sum());
        })
        .map_err(|_| "worker pool is not accepting jobs")?;
        pending += 1;
        start = end + 1;
    }

    let mut total = 0u64;
    for _ in 0..pending {
        match results.pop_wait_timeout(PARTIAL_RESULT_TIMEOUT) {
            PopResult::Item(partial) => total += partial,
            PopResult::TimedOut | PopResult::Closed => {
                return Err("missing partial result".into());
            }
        }
    }
    pool.shutdown();
    debug!(n, jobs = pending, seconds = probe.duration().as_secs_f64(), "summed");
    Ok(total)
}

fn application() -> Result<Application, ConfigError> {
    let types = types()?;
    Application::builder()
        .description("Typed command dispatch demo.")
        .commands(commands(&types)?)
        .build()
}

fn main() {
    let code = {
        let _guard = init_tracing(&TelemetryConfig::from_env());
        let mut app = application().unwrap_or_else(|e| exit_on_config_error(e));
        app.launch_env()
    };
    std::process::exit(code);
}
