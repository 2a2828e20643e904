//! principalctl configuration object and helpers.
mod loading;
mod logging;
mod object;

pub use self::loading::apply_env;
pub use self::loading::load;
pub use self::loading::load_or_default;
pub use self::loading::Error;
pub use self::logging::LogLevel;
pub use self::logging::LogMode;
pub use self::logging::LoggingConf;
pub use self::object::Conf;
