// Prompt tracking and output cleanup for IOS-style interactive shells.
//
// The shell has no framing: a command's output ends when the device prints
// its prompt again. `PromptMatcher` recognises that prompt in every mode
// (`sw1#`, `sw1>`, `sw1(config)#`, `sw1(config-if)#`).

/// Lines that IOS prints when it refuses a command.
const ERROR_MARKERS: &[&str] = &[
    "% Invalid input",
    "% Incomplete command",
    "% Ambiguous command",
    "% Unknown command",
    "% Unrecognized command",
    "% Bad ",
    "% Error",
    "% Authorization failed",
];

/// Recognises the device prompt once its base (hostname) is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMatcher {
    base: String,
}

impl PromptMatcher {
    /// Learn the prompt from the tail of a shell buffer.
    ///
    /// Returns `None` until the buffer ends in something prompt-shaped.
    pub fn detect(buffer: &str) -> Option<Self> {
        let line = last_line(buffer)?;
        let base = line.strip_suffix(['#', '>'])?;
        let base = base.split('(').next().unwrap_or(base).trim();
        // Hostnames carry at least one letter or digit; `#####` is banner art.
        if !base.chars().any(char::is_alphanumeric) || base.contains(char::is_whitespace) {
            return None;
        }
        Some(Self { base: base.to_owned() })
    }

    /// The hostname portion of the prompt.
    pub fn hostname(&self) -> &str {
        &self.base
    }

    /// Whether `line` is this device's prompt in any mode.
    pub fn is_prompt(&self, line: &str) -> bool {
        let Some(rest) = line.trim().strip_prefix(self.base.as_str()) else {
            return false;
        };
        let Some(mode) = rest.strip_suffix(['#', '>']) else {
            return false;
        };
        mode.is_empty() || (mode.starts_with('(') && mode.ends_with(')'))
    }

    /// Whether the buffer currently ends with the prompt.
    pub fn ends_with_prompt(&self, buffer: &str) -> bool {
        last_line(buffer).is_some_and(|line| self.is_prompt(line))
    }

    /// Whether the buffer ends at the privileged (`#`) prompt.
    pub fn is_privileged(&self, buffer: &str) -> bool {
        last_line(buffer).is_some_and(|line| self.is_prompt(line) && line.ends_with('#'))
    }
}

/// Remove the echoed command and the trailing prompt from a raw exchange.
pub fn clean_output(raw: &str, command: &str, prompt: &PromptMatcher) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "");
    let mut lines: Vec<&str> = normalized.lines().collect();

    let command = command.trim();
    if !command.is_empty()
        && lines
            .first()
            .is_some_and(|first| first.trim_end().ends_with(command))
    {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty() || prompt.is_prompt(l)) {
        lines.pop();
    }
    lines.join("\n")
}

/// The first line of `output` carrying an IOS error marker, if any.
pub fn error_marker(output: &str) -> Option<&str> {
    output
        .lines()
        .map(str::trim)
        .find(|line| ERROR_MARKERS.iter().any(|m| line.starts_with(m)))
}

fn last_line(buffer: &str) -> Option<&str> {
    buffer
        .trim_end()
        .rsplit('\n')
        .next()
        .map(|l| l.trim_matches(|c: char| c == '\r' || c.is_whitespace()))
        .filter(|l| !l.is_empty())
}
