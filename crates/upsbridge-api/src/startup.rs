//! Startup banner and console output formatting.

use std::sync::OnceLock;

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_DIM: &str = "\x1b[2m";
const ANSI_GREEN: &str = "\x1b[32m";
const ANSI_BLUE: &str = "\x1b[34m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_GRAY: &str = "\x1b[90m";

/// Whether colors are enabled (off with `NO_COLOR` or without a TTY).
fn colors_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }
        if std::env::var("UPSBRIDGE_COLOR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
        {
            return true;
        }
        atty::is(atty::Stream::Stderr)
    })
}

fn color(s: impl AsRef<str>, ansi: &str) -> String {
    if colors_enabled() {
        format!("{}{}{}", ansi, s.as_ref(), ANSI_RESET)
    } else {
        s.as_ref().to_string()
    }
}

/// Startup phase tracker for organized console output.
pub struct StartupLogger {
    phase: StartupPhase,
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StartupPhase {
    Banner,
    Configuration,
    Services,
    Ready,
}

impl StartupLogger {
    pub fn new() -> Self {
        Self {
            phase: StartupPhase::Banner,
            quiet: false,
        }
    }

    /// Logger that prints nothing.
    pub fn quiet() -> Self {
        Self {
            phase: StartupPhase::Banner,
            quiet: true,
        }
    }

    pub fn banner(&mut self) {
        if self.quiet {
            return;
        }
        self.phase = StartupPhase::Banner;

        println!();
        println!("{}", color("┌─────────────────────────────────────────┐", ANSI_CYAN));
        println!(
            "{}{}{}",
            color("│ ", ANSI_CYAN),
            color(format!("UPS Bridge v{:<28}", env!("CARGO_PKG_VERSION")), ANSI_BOLD),
            color("│", ANSI_CYAN)
        );
        println!(
            "{}{}{}",
            color("│ ", ANSI_CYAN),
            color("Network-MS telemetry as JSON", ANSI_DIM),
            color("            │", ANSI_CYAN)
        );
        println!("{}", color("└─────────────────────────────────────────┘", ANSI_CYAN));
        println!();
    }

    fn phase(&mut self, phase: StartupPhase, title: &str) {
        if self.quiet || self.phase == phase {
            return;
        }
        println!(
            "{} {} {}",
            color("›", ANSI_BOLD),
            color(title, ANSI_BLUE),
            color("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━", ANSI_DIM)
        );
        self.phase = phase;
    }

    pub fn phase_config(&mut self) {
        self.phase(StartupPhase::Configuration, "Configuration");
    }

    pub fn phase_services(&mut self) {
        self.phase(StartupPhase::Services, "Services");
    }

    pub fn phase_ready(&mut self) {
        if self.quiet || self.phase == StartupPhase::Ready {
            return;
        }
        println!();
        println!("{} {}", color("✓", ANSI_GREEN), color("Server ready", ANSI_BOLD));
        self.phase = StartupPhase::Ready;
    }

    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("  {} {}", color("⚠", ANSI_YELLOW), message);
    }

    /// Indented, dim detail line.
    pub fn detail(&self, message: &str) {
        if self.quiet {
            return;
        }
        println!("    {}", color(message, ANSI_GRAY));
    }

    pub fn ready_info(&self, addr: &str) {
        if self.quiet {
            return;
        }
        println!();
        println!(
            "  {} {}",
            color("Telemetry:", ANSI_BOLD),
            color(format!("http://{}/?format=json", addr), ANSI_CYAN)
        );
        println!(
            "  {} {}",
            color("Health:   ", ANSI_BOLD),
            color(format!("http://{}/api/health", addr), ANSI_CYAN)
        );
        println!();
        println!("{} {}", color("Press", ANSI_BOLD), color("Ctrl+C to stop.", ANSI_DIM));
        println!();
    }

    pub fn service(&self, name: &str, status: ServiceStatus) {
        if self.quiet {
            return;
        }
        let (icon, color_code) = match status {
            ServiceStatus::Started => ("✓", ANSI_GREEN),
            ServiceStatus::Disabled => ("○", ANSI_GRAY),
        };
        println!("    {} {:30}", color(icon, color_code), name);
    }
}

/// Service status for startup logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Started,
    Disabled,
}

impl Default for StartupLogger {
    fn default() -> Self {
        Self::new()
    }
}
