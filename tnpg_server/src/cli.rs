use std::{env, env::VarError};

/// Settings shown with their value.
const DISPLAY_ENVS: [&str; 10] = [
    "RUST_LOG",
    "TNPG_HOST",
    "TNPG_MERCHANT_ID",
    "TNPG_API_KEY",
    "TNPG_PROTOCOL_VERSION",
    "TNPG_REPLAY_WINDOW",
    "TNPG_SERVER_HOST",
    "TNPG_SERVER_PORT",
    "TNPG_IPN_SIGNED",
    "TNPG_REPLAY_CACHE",
];

/// Settings that are only reported as present or absent.
const SECRET_ENVS: [&str; 1] = ["TNPG_API_SECRET"];

/// The server takes no arguments. If any are given, print the help text and the current settings, and return `true`
/// so that `main` exits without starting the server.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().len() > 1;
    if has_cli_args {
        println!("\n{}\n", include_str!("./cli-help.txt"));
        println!("Current environment values:");
        DISPLAY_ENVS.iter().for_each(|&name| println!("  {name:<35} {}", describe(name, false)));
        SECRET_ENVS.iter().for_each(|&name| println!("  {name:<35} {}", describe(name, true)));
    }
    has_cli_args
}

fn describe(name: &str, secret: bool) -> String {
    match env::var(name) {
        Ok(s) if secret && !s.trim().is_empty() => "Set (hidden)".into(),
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(_)) if secret => "Invalid value (hidden)".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn secrets_are_never_echoed() {
        env::set_var("TNPG_CLI_TEST_SECRET", "hunter2");
        assert_eq!(describe("TNPG_CLI_TEST_SECRET", true), "Set (hidden)");
        assert_eq!(describe("TNPG_CLI_TEST_SECRET", false), "hunter2");
        assert_eq!(describe("TNPG_CLI_TEST_UNSET", true), "Not set");
    }
}
