use anyhow::{Result, bail};
use labpass_core::ResourceStore;
use labpass_core::fhir_reference::{ReferenceTarget, parse_reference};

use crate::cli::GetArgs;
use crate::client::FhirClient;
use crate::config::resolve_server;
use crate::output::print_value;

pub async fn get(cli_server: Option<&str>, args: &GetArgs) -> Result<()> {
    let server = resolve_server(cli_server, args.config.as_deref())?;
    let client = FhirClient::new(&server);

    let target = parse_reference(&args.reference, Some(client.base_url()))?;
    let ReferenceTarget::Resource(reference) = target else {
        bail!(
            "Invalid reference \"{}\". Expected format: ResourceType/id",
            args.reference
        );
    };

    let resource = client.read(&reference.resource_type, &reference.id).await?;
    print_value(&resource)
}
