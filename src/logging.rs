use std::fmt::Display;

use colored::{Color, Colorize};
use log::Level;

/// External crates only need to log warnings and errors
const ALLOWED_EXTERNAL_LEVELS: [Level; 2] = [Level::Warn, Level::Error];
const ALLOWED_LEVELS: [Level; 3] = [Level::Info, Level::Warn, Level::Error];

pub fn init_logger() -> Result<(), log::SetLoggerError> {
    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::from_str(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                level_to_string(&record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target,
                message
            ))
        })
        .filter(|meta| {
            let target = Target::from_str(meta.target());

            let is_allowed = ALLOWED_LEVELS.contains(&meta.level());
            let is_severe = ALLOWED_EXTERNAL_LEVELS.contains(&meta.level());

            target.is_local() && is_allowed || is_severe
        })
        .chain(std::io::stdout())
        .apply()
}

/// Colors used for output outside of log records
pub struct LogColor;

impl LogColor {
    pub const RED: Color = Color::Red;
    pub const DIMMED: Color = Color::BrightBlack;
}

#[derive(Debug, PartialEq, Eq)]
enum Target {
    External(String),
    App,
    Server,
    Collab,
}

impl Target {
    fn from_str(str: &str) -> Self {
        let module = str.split("::").next().unwrap_or_default();

        match module {
            "singalong" => Self::App,
            "singalong_server" => Self::Server,
            "singalong_collab" => Self::Collab,
            other => Target::External(other.to_string()),
        }
    }

    fn is_local(&self) -> bool {
        !matches!(self, Self::External(_))
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let result = match self {
            Target::External(x) => x.as_str().clear(),
            Target::App => "APP".blue(),
            Target::Server => "SERVER".bright_green(),
            Target::Collab => "COLLAB".bright_purple(),
        };

        Display::fmt(&result, f)
    }
}

fn level_to_string(level: &Level) -> String {
    match level {
        Level::Error => " ERR ".black().on_red().bold().to_string(),
        Level::Warn => " WRN ".black().on_yellow().bold().to_string(),
        Level::Info => " INF ".black().on_blue().bold().to_string(),
        Level::Debug => " DBG ".white().on_black().to_string(),
        Level::Trace => " TRC ".to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::Target;

    #[test]
    fn targets_are_labelled_by_crate() {
        assert_eq!(Target::from_str("singalong_collab::rooms::room"), Target::Collab);
        assert_eq!(Target::from_str("singalong_server"), Target::Server);
        assert_eq!(Target::from_str("singalong"), Target::App);
        assert_eq!(
            Target::from_str("hyper::proto"),
            Target::External("hyper".to_string())
        );
        assert!(!Target::from_str("tokio").is_local());
    }
}
