//! Interactive collection of the loader configuration.
//!
//! Questions run strictly in order. The region answer binds the regional clients
//! that the password question later encrypts with, so it always comes first.

pub mod console;

pub use console::{Console, StdConsole, stdio};

use common::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, warn};

use crate::provision::{InstallReport, Installer};
use crate::record::{ConfigRecord, ConfigRecordBuilder};
use crate::services::{RegionalServices, ServiceProvider};
use crate::validation::{self, SUPPORTED_REGIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Region,
    S3Location,
    FilenameFilter,
    ClusterEndpoint,
    ClusterPort,
    TargetTable,
    CopyOptions,
    PreLoadStatement,
    PostLoadStatement,
    BatchSize,
    BatchTimeout,
    Username,
    Password,
    ManifestBucket,
    ManifestPrefix,
    FailedManifestPrefix,
    SuccessTopic,
    FailureTopic,
}

impl Question {
    pub const ALL: [Question; 18] = [
        Question::Region,
        Question::S3Location,
        Question::FilenameFilter,
        Question::ClusterEndpoint,
        Question::ClusterPort,
        Question::TargetTable,
        Question::CopyOptions,
        Question::PreLoadStatement,
        Question::PostLoadStatement,
        Question::BatchSize,
        Question::BatchTimeout,
        Question::Username,
        Question::Password,
        Question::ManifestBucket,
        Question::ManifestPrefix,
        Question::FailedManifestPrefix,
        Question::SuccessTopic,
        Question::FailureTopic,
    ];

    pub fn prompt(self) -> &'static str {
        match self {
            Question::Region => "Enter the Region for the Configuration (Reqd.) > ",
            Question::S3Location => "Enter the S3 Bucket & Prefix to watch for files (Reqd.) > ",
            Question::FilenameFilter => "Enter a Filename Filter Regex > ",
            Question::ClusterEndpoint => {
                "Enter the Vertica Cluster Endpoint (Public IP or DNS name) (Reqd.) > "
            }
            Question::ClusterPort => "Enter the Vertica Cluster Port [5433]> ",
            Question::TargetTable => "Enter the Table to be Loaded (Reqd.) > ",
            Question::CopyOptions => {
                "Load Options - COPY table FROM files [*options*] (Optional)> "
            }
            Question::PreLoadStatement => "Enter SQL statement to run before the load (Optional)> ",
            Question::PostLoadStatement => "Enter SQL statement to run after the load (Optional)> ",
            Question::BatchSize => "How many files should be buffered before loading? > ",
            Question::BatchTimeout => {
                "How old should we allow a Batch to be before loading (seconds)? > "
            }
            Question::Username => "Enter the Vertica Database Username (Reqd.) > ",
            Question::Password => "Enter the Vertica Database Password (Reqd.) > ",
            Question::ManifestBucket => "Enter the S3 Bucket for COPY Manifests (Reqd.) > ",
            Question::ManifestPrefix => "Enter the Prefix for COPY Manifests (Reqd.) > ",
            Question::FailedManifestPrefix => {
                "Enter the Prefix to use for Failed Load Manifest Storage (Reqd.) > "
            }
            Question::SuccessTopic => "Enter the SNS Topic ARN for Successful Loads (Optional) > ",
            Question::FailureTopic => "Enter the SNS Topic ARN for Failed Loads (Optional) > ",
        }
    }
}

/// State threaded through the question sequence.
struct Session {
    builder: ConfigRecordBuilder,
    services: Option<RegionalServices>,
}

impl Session {
    fn services(&self) -> Result<&RegionalServices> {
        self.services
            .as_ref()
            .ok_or_else(|| Error::Other("Region has not been configured".to_string()))
    }
}

pub struct Wizard<P> {
    provider: P,
    installer: Installer,
}

impl<P: ServiceProvider> Wizard<P> {
    pub fn new(provider: P, installer: Installer) -> Self {
        Self {
            provider,
            installer,
        }
    }

    /// Asks every question, then provisions tables and writes the collected record.
    pub async fn run<R, W>(&self, console: &mut Console<R, W>) -> Result<InstallReport>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let (record, services) = self.collect(console).await?;
        let report = match self.installer.install(&services, &record).await {
            Ok(report) => report,
            Err(e) => return Err(reject(console, e).await),
        };

        console
            .say(&format!(
                "Configuration for {} successfully written in {}",
                report.s3_prefix, report.region
            ))
            .await?;

        Ok(report)
    }

    /// Runs the question sequence and closes the console.
    ///
    /// A rejected answer is reported to the operator and ends the sequence.
    pub async fn collect<R, W>(
        &self,
        console: &mut Console<R, W>,
    ) -> Result<(ConfigRecord, RegionalServices)>
    where
        R: AsyncBufRead + Unpin + Send,
        W: AsyncWrite + Unpin + Send,
    {
        let mut session = Session {
            builder: ConfigRecordBuilder::new(),
            services: None,
        };
        debug!(current_batch = %session.builder.current_batch(), "Starting configuration");

        for question in Question::ALL {
            let answered = match console.ask(question.prompt()).await {
                Ok(answer) => self.answer(question, &answer, &mut session).await,
                Err(e) => Err(e),
            };

            if let Err(e) = answered {
                return Err(reject(console, e).await);
            }
            debug!(?question, "Answer accepted");
        }

        console.close().await?;

        let services = session
            .services
            .ok_or_else(|| Error::Other("Region has not been configured".to_string()))?;
        let record = match session.builder.build() {
            Ok(record) => record,
            Err(e) => return Err(reject(console, e.into()).await),
        };

        Ok((record, services))
    }

    async fn answer(&self, question: Question, answer: &str, session: &mut Session) -> Result<()> {
        match question {
            Question::Region => {
                let region = validation::require(answer, "You Must Provide a Region")?;
                let region = validation::one_of(&SUPPORTED_REGIONS, &region)?;
                session.services = Some(self.provider.connect(&region).await?);
                session.builder.region(region);
            }
            Question::S3Location => {
                let message = "You Must Provide an S3 Bucket Name, and optionally a Prefix";
                let location = validation::require(answer, message)?;
                let location =
                    validation::require(&validation::normalize_s3_location(&location), message)?;
                session.builder.s3_prefix(location);
            }
            Question::FilenameFilter => {
                if let Some(filter) = validation::blank(answer) {
                    session.builder.filename_filter_regex(validation::pattern(&filter)?);
                }
            }
            Question::ClusterEndpoint => {
                session.builder.cluster_endpoint(validation::require(
                    answer,
                    "You Must Provide a Vertica Cluster Endpoint",
                )?);
            }
            Question::ClusterPort => {
                session.builder.cluster_port(validation::cluster_port(answer)?);
            }
            Question::TargetTable => {
                session
                    .builder
                    .target_table(validation::require(answer, "You Must Provide a Table Name")?);
            }
            Question::CopyOptions => {
                if let Some(options) = validation::blank(answer) {
                    session.builder.copy_options(options);
                }
            }
            Question::PreLoadStatement => {
                if let Some(statement) = validation::blank(answer) {
                    session.builder.pre_load_statement(statement);
                }
            }
            Question::PostLoadStatement => {
                if let Some(statement) = validation::blank(answer) {
                    session.builder.post_load_statement(statement);
                }
            }
            Question::BatchSize => {
                if let Some(size) = validation::blank(answer) {
                    session.builder.batch_size(validation::integer(&size)?);
                }
            }
            Question::BatchTimeout => {
                if let Some(secs) = validation::blank(answer) {
                    session.builder.batch_timeout_secs(validation::integer(&secs)?);
                }
            }
            Question::Username => {
                session
                    .builder
                    .connect_user(validation::require(answer, "You Must Provide a Username")?);
            }
            Question::Password => {
                // Stored exactly as typed; only presence is checked.
                validation::require(answer, "You Must Provide a Password")?;
                let ciphertext = session.services()?.cipher.encrypt(answer).await?;
                session
                    .builder
                    .connect_password(ciphertext.to_lambda_string_format());
            }
            Question::ManifestBucket => {
                session.builder.manifest_bucket(validation::require(
                    answer,
                    "You Must Provide a Bucket Name for Manifest File Storage",
                )?);
            }
            Question::ManifestPrefix => {
                session.builder.manifest_key(validation::require(
                    answer,
                    "You Must Provide a Prefix for Manifests",
                )?);
            }
            Question::FailedManifestPrefix => {
                session.builder.failed_manifest_key(validation::require(
                    answer,
                    "You Must Provide a Prefix for Failed Load Manifests",
                )?);
            }
            Question::SuccessTopic => {
                if let Some(arn) = validation::blank(answer) {
                    session.builder.success_topic_arn(arn);
                }
            }
            Question::FailureTopic => {
                if let Some(arn) = validation::blank(answer) {
                    session.builder.failure_topic_arn(arn);
                }
            }
        }

        Ok(())
    }
}

/// Shows a rejected answer to the operator and closes the console.
///
/// Returns the original error; console failures while reporting are only logged.
async fn reject<R, W>(console: &mut Console<R, W>, error: Error) -> Error
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    if let Error::Validation(reason) = &error {
        if let Err(e) = console.say(&reason.to_string()).await {
            warn!(error = %e, "Could not show validation message");
        }
    }
    if let Err(e) = console.close().await {
        warn!(error = %e, "Could not close console");
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_is_asked_first() {
        assert_eq!(Question::ALL[0], Question::Region);
    }

    #[test]
    fn test_password_follows_username() {
        let position = |q: Question| Question::ALL.iter().position(|x| *x == q).unwrap();
        assert_eq!(position(Question::Password), position(Question::Username) + 1);
        assert_eq!(position(Question::FailureTopic), Question::ALL.len() - 1);
    }

    #[test]
    fn test_prompts_are_distinct() {
        let mut prompts: Vec<&str> = Question::ALL.iter().map(|q| q.prompt()).collect();
        prompts.sort();
        prompts.dedup();
        assert_eq!(prompts.len(), Question::ALL.len());
    }
}
