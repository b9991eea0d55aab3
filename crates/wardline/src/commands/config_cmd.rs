//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, KEYRING_SERVICE, Profile};
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Show => {
            let mut config = config::load_config()?;
            // Never print plaintext tokens back out.
            for profile in config.profiles.values_mut() {
                if profile.token.is_some() {
                    profile.token = Some("<redacted>".into());
                }
            }
            let rendered = toml::to_string_pretty(&config).map_err(|e| CliError::Validation {
                field: "config".into(),
                reason: format!("failed to serialize config: {e}"),
            })?;
            output::print_output(rendered.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

/// Interactive profile wizard.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("wardline -- configuration wizard");
    eprintln!("  Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(global.profile.clone().unwrap_or_else(|| "default".into()))
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Roster API URL")
        .default(
            global
                .api_url
                .clone()
                .unwrap_or_else(|| "https://roster.example.com".into()),
        )
        .interact_text()
        .map_err(prompt_err)?;

    let locale_choices = &["English", "Arabic"];
    let locale_selection = Select::new()
        .with_prompt("Display language")
        .items(locale_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    let locale = if locale_selection == 0 { "en" } else { "ar" };

    let token = Password::new()
        .with_prompt("Bearer token")
        .allow_empty_password(false)
        .interact()
        .map_err(prompt_err)?;

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the token?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let token_field = if store_selection == 0 {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
            .map_err(|e| CliError::Validation {
                field: "keyring".into(),
                reason: format!("failed to access keyring: {e}"),
            })?;
        entry.set_password(&token).map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store token in keyring: {e}"),
        })?;
        eprintln!("  Token stored in system keyring");
        None
    } else {
        Some(token)
    };

    let mut config = config::load_config_or_default();
    config.profiles.insert(
        profile_name.clone(),
        Profile {
            api_url,
            locale: Some(locale.into()),
            token: token_field,
            ..Profile::default()
        },
    );
    if config.default_profile.is_none() || config.profiles.len() == 1 {
        config.default_profile = Some(profile_name.clone());
    }
    config::save_config(&config)?;

    eprintln!("\nProfile '{profile_name}' saved. Try: wardline unread");
    Ok(())
}
