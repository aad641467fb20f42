pub mod crypto;
pub mod provision;
pub mod record;
pub mod services;
pub mod store;
pub mod validation;
pub mod wizard;

use common::Result;
use common::config::Settings;
use provision::{InstallReport, Installer};
use services::AwsServices;
use wizard::Wizard;

/// Runs the interactive setup against stdin/stdout and the AWS account in the environment.
pub async fn run_setup_wizard(settings: &Settings) -> Result<InstallReport> {
    let wizard = Wizard::new(AwsServices::new(settings), Installer::from_settings(settings));
    let mut console = wizard::stdio();

    wizard.run(&mut console).await
}
