//! Gateway construction seam shared by the CLI subcommands.

use stroll_core::MapsGateway;
use stroll_data::{GoogleMapsConfig, GoogleMapsGateway};

use crate::CliError;

/// Builds the gateway for the current invocation.
pub(crate) trait GatewayBuilder {
    fn build(&self, config: GoogleMapsConfig) -> Result<Box<dyn MapsGateway>, CliError>;
}

pub(crate) struct GoogleGatewayBuilder;

impl GatewayBuilder for GoogleGatewayBuilder {
    fn build(&self, config: GoogleMapsConfig) -> Result<Box<dyn MapsGateway>, CliError> {
        let gateway = GoogleMapsGateway::with_config(config).map_err(CliError::BuildGateway)?;
        Ok(Box::new(gateway))
    }
}
