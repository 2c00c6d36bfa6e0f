use crate::backend::RunningApplication;
use anyhow::Result;
#[cfg(target_os = "macos")]
use anyhow::Context;
#[cfg(target_os = "macos")]
use std::process::Command;
use std::time::Duration;

const FIELD_SEPARATOR: char = '\t';

/// Lists regular applications as `pid<TAB>name<TAB>bundle id<TAB>visible` lines.
pub const LIST_PROCESSES_SCRIPT: &str = r#"
    tell application "System Events"
        set out to ""
        repeat with p in (every application process whose background only is false)
            set out to out & (unix id of p) & tab & (name of p) & tab & (bundle identifier of p) & tab & (visible of p) & linefeed
        end repeat
        return out
    end tell
"#;

pub const FRONTMOST_PID_SCRIPT: &str = r#"
    tell application "System Events"
        return unix id of first application process whose frontmost is true
    end tell
"#;

pub const UNHIDE_LINES: [&str; 6] = [
    "on run argv",
    "set targetPid to (item 1 of argv) as integer",
    "tell application \"System Events\"",
    "set visible of (first application process whose unix id is targetPid) to true",
    "end tell",
    "end run",
];

pub const ACTIVATE_LINES: [&str; 6] = [
    "on run argv",
    "set targetPid to (item 1 of argv) as integer",
    "tell application \"System Events\"",
    "set frontmost of (first application process whose unix id is targetPid) to true",
    "end tell",
    "end run",
];

pub fn run(script: &str) -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()
            .context("Failed to run AppleScript")?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(anyhow::anyhow!("AppleScript Error: {}", stderr));
        }

        Ok(stdout)
    }
    #[cfg(not(target_os = "macos"))]
    {
        let _ = script;
        Err(anyhow::anyhow!("AppleScript is only available on macOS"))
    }
}

/// Runs a multi-line script with `argv`, so values never need quoting.
pub fn run_lines_with_args(lines: &[&str], args: &[String]) -> Result<String> {
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("osascript");
        for line in lines {
            cmd.arg("-e").arg(line);
        }
        cmd.arg("--");
        for arg in args {
            cmd.arg(arg);
        }

        let output = cmd.output().context("Failed to run AppleScript")?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(anyhow::anyhow!("AppleScript Error: {}", stderr));
        }

        Ok(stdout)
    }
    #[cfg(not(target_os = "macos"))]
    {
        let _ = (lines, args);
        Err(anyhow::anyhow!("AppleScript is only available on macOS"))
    }
}

/// Runs a blocking script call off the async runtime, bounded by `limit`.
pub async fn run_blocking<F>(limit: Duration, f: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(f);
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(anyhow::anyhow!("AppleScript task panicked: {}", e)),
        Err(_) => Err(anyhow::anyhow!("AppleScript timed out after {}ms", limit.as_millis())),
    }
}

pub fn parse_process_listing(output: &str) -> Vec<RunningApplication> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEPARATOR);
            let pid = fields.next()?.trim().parse::<i32>().ok()?;
            let name = fields.next()?.trim().to_string();
            if name.is_empty() {
                return None;
            }
            let bundle_id = fields
                .next()
                .map(str::trim)
                .filter(|id| !id.is_empty() && *id != "missing value")
                .map(str::to_string);
            let visible = fields.next().map(|v| v.trim() != "false").unwrap_or(true);
            Some(RunningApplication {
                pid,
                name,
                bundle_id,
                hidden: !visible,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_listing() {
        let output = "412\tFinder\tcom.apple.finder\ttrue\n\
                      913\tMicrosoft Excel\tcom.microsoft.Excel\tfalse\n\
                      77\tSome Tool\tmissing value\ttrue\n\
                      garbage line\n";
        let apps = parse_process_listing(output);
        assert_eq!(apps.len(), 3);
        assert_eq!(apps[0].name, "Finder");
        assert_eq!(apps[0].bundle_id.as_deref(), Some("com.apple.finder"));
        assert!(!apps[0].hidden);
        assert!(apps[1].hidden);
        assert_eq!(apps[2].pid, 77);
        assert!(apps[2].bundle_id.is_none());
    }

    #[tokio::test]
    async fn blocking_calls_are_bounded() {
        let result = run_blocking(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(String::new())
        })
        .await;
        assert!(result.unwrap_err().to_string().contains("timed out"));

        let ok = run_blocking(Duration::from_secs(1), || Ok("done".to_string())).await;
        assert_eq!(ok.unwrap(), "done");
    }
}
