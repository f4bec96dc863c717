use std::time::Duration;

pub use taskdeck_core::config::*;

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    let timeout = (cli.timeout > 0).then(|| Duration::from_secs(cli.timeout));
    let config = AppConfig::discover(cli.data_dir.clone(), cli.api_url.clone())?;
    Ok(config
        .with_auth_scheme(resolve_auth_scheme(cli.auth_scheme.clone()))
        .with_request_timeout(timeout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn zero_timeout_disables_it() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from(["taskdeck", "--data-dir", data_dir, "--timeout", "0", "whoami"])
            .unwrap();
        assert_eq!(from_cli(&cli).unwrap().request_timeout(), None);

        let cli = Cli::try_parse_from(["taskdeck", "--data-dir", data_dir, "whoami"]).unwrap();
        assert_eq!(
            from_cli(&cli).unwrap().request_timeout(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn auth_scheme_flag_reaches_the_config() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let cli = Cli::try_parse_from([
            "taskdeck",
            "--data-dir",
            data_dir,
            "whoami",
            "--auth-scheme",
            "none",
        ])
        .unwrap();
        assert_eq!(from_cli(&cli).unwrap().auth_scheme(), "");

        let cli = Cli::try_parse_from(["taskdeck", "--data-dir", data_dir, "--auth-scheme", "Token", "whoami"])
            .unwrap();
        assert_eq!(from_cli(&cli).unwrap().auth_scheme(), "Token");
    }
}
