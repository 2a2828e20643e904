//! Configure process logging.
use std::panic::RefUnwindSafe;
use std::panic::UnwindSafe;
use std::sync::Mutex;

use slog::o;
use slog::Drain;
use slog::FnValue;
use slog::IgnoreResult;
use slog::Logger;
use slog::Never;
use slog::OwnedKVList;
use slog::Record;
use slog_async::Async;
use slog_term::FullFormat;
use slog_term::TermDecorator;

use principals_conf::LogLevel;
use principals_conf::LogMode;
use principals_conf::LoggingConf;

/// Alternative implementation of slog's [`LevelFilter`] with `Ok == ()`.
///
/// The default [`LevelFilter`] implementation wraps `D::Ok` into an [`Option`].
/// This makes it impossible to wrap a filtering drain into a [`Logger`].
///
/// [`LevelFilter`]: slog::LevelFilter
#[derive(Debug, Clone)]
struct LevelFilter<D: Drain>(pub D, pub slog::Level);
impl<D: Drain> Drain for LevelFilter<D> {
    type Ok = ();
    type Err = D::Err;
    fn log(&self, record: &Record, logger_values: &OwnedKVList) -> Result<Self::Ok, Self::Err> {
        if record.level().is_at_least(self.1) {
            self.0.log(record, logger_values)?;
        }
        Ok(())
    }
}

fn level(level: LogLevel) -> slog::Level {
    match level {
        LogLevel::Critical => slog::Level::Critical,
        LogLevel::Error => slog::Level::Error,
        LogLevel::Warning => slog::Level::Warning,
        LogLevel::Info => slog::Level::Info,
        LogLevel::Debug => slog::Level::Debug,
    }
}

/// Create a [`Logger`] emitting to standard error as configured.
pub fn configure(conf: &LoggingConf) -> Logger {
    match conf.mode {
        LogMode::Json => {
            let drain = slog_json::Json::new(std::io::stderr())
                .set_newlines(true)
                .set_flush(true)
                .add_default_keys()
                .build();
            let drain = Mutex::new(drain).map(IgnoreResult::new);
            into_logger(conf, drain)
        }
        LogMode::Term => {
            let decorator = TermDecorator::new().stderr().build();
            let drain = FullFormat::new(decorator).build();
            let drain = Mutex::new(drain).map(IgnoreResult::new);
            into_logger(conf, drain)
        }
    }
}

/// Filter events by level and optionally flush them from a background thread.
fn into_logger<D>(conf: &LoggingConf, drain: D) -> Logger
where
    D: Drain<Ok = (), Err = Never> + Send + Sync + RefUnwindSafe + UnwindSafe + 'static,
{
    let drain = LevelFilter(drain, level(conf.level));
    // rustc can't infer lifetimes correctly when using Record::module.
    #[allow(clippy::redundant_closure)]
    let values = o!("module" => FnValue(|rinfo: &Record| rinfo.module()));
    match conf.async_flush {
        true => Logger::root(Async::new(drain).build().ignore_res(), values),
        false => Logger::root(drain, values),
    }
}
