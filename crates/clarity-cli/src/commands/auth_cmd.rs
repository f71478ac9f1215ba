use clarity_core::auth::{LoginCredentials, PasswordStrength, SignUpRequest};

use crate::auth::{auth_client, load_stored_token};
use crate::cli::AuthCommands;
use crate::commands::common::CommandContext;
use crate::error::CliError;

pub async fn run_auth(context: &CommandContext, command: AuthCommands) -> Result<(), CliError> {
    let profile_name = context.profile_name.as_str();
    match command {
        AuthCommands::Signup {
            email,
            username,
            name,
            password,
        } => {
            let request = SignUpRequest {
                email,
                username,
                name,
                password,
            };
            let request = request.validated()?;
            println!(
                "Password strength: {}",
                PasswordStrength::evaluate(&request.password)
            );

            let client = auth_client(profile_name, &context.config)?;
            let response = client
                .sign_up(&request)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!("{}", signup_notice(response.message.as_deref()));
            Ok(())
        }
        AuthCommands::Login {
            identifier,
            password,
        } => {
            let credentials = LoginCredentials {
                identifier,
                password,
            }
            .validated()?;
            let client = auth_client(profile_name, &context.config)?;
            client
                .login(&credentials)
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;
            println!(
                "Signed in profile '{profile_name}' as {}",
                credentials.identifier
            );
            Ok(())
        }
        AuthCommands::Status => {
            if load_stored_token(profile_name)?.is_some() {
                println!("Profile '{profile_name}' is signed in.");
            } else {
                println!("Profile '{profile_name}' is not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            auth_client(profile_name, &context.config)?.logout()?;
            println!("Signed out profile '{profile_name}'");
            Ok(())
        }
    }
}

pub fn signup_notice(message: Option<&str>) -> String {
    let message = message
        .map(|message| message.trim().trim_end_matches(['.', '!']))
        .filter(|message| !message.is_empty())
        .unwrap_or("Account created");
    format!("{message}. Run `clarity auth login` to sign in.")
}
