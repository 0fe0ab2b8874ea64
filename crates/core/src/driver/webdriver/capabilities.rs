//! Session capabilities for a profile-bound browser.

use serde_json::{json, Value};

const BROWSER_ARGS: [&str; 5] = [
    "--start-maximized",
    "--disable-blink-features=AutomationControlled",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-popup-blocking",
];

/// `--user-data-dir` / `--profile-directory` arguments for a profile path.
///
/// A path naming a profile folder (`.../Default`, `.../Profile 3`) is split
/// into its parent user-data dir and the folder name; any other path is
/// taken as the user-data dir with the `Default` profile.
pub(super) fn profile_args(profile_path: &str) -> Vec<String> {
    let normalized = profile_path.replace('\\', "/");
    let normalized = normalized.trim_end_matches('/');

    if normalized.contains("/Profile ") || normalized.ends_with("/Default") {
        if let Some((user_data_dir, profile_dir)) = normalized.rsplit_once('/') {
            return vec![
                format!("--user-data-dir={}", user_data_dir),
                format!("--profile-directory={}", profile_dir),
            ];
        }
    }

    vec![
        format!("--user-data-dir={}", profile_path),
        "--profile-directory=Default".to_string(),
    ]
}

/// Vendor options key for the configured browser, if it takes Chromium args.
fn options_key(browser: &str) -> Option<&'static str> {
    let browser = browser.to_ascii_lowercase();
    if browser.contains("edge") {
        Some("ms:edgeOptions")
    } else if browser.contains("chrome") {
        Some("goog:chromeOptions")
    } else {
        None
    }
}

/// W3C `POST /session` body.
pub(super) fn session_capabilities(browser: &str, profile_path: &str) -> Value {
    let mut always_match = json!({ "browserName": browser });

    if let Some(key) = options_key(browser) {
        let mut args = profile_args(profile_path);
        args.extend(BROWSER_ARGS.iter().map(|a| a.to_string()));
        always_match[key] = json!({
            "args": args,
            "excludeSwitches": ["enable-automation"],
            "useAutomationExtension": false,
            "prefs": {
                "profile.default_content_setting_values.notifications": 2
            }
        });
    }

    json!({ "capabilities": { "alwaysMatch": always_match } })
}
