//! YAML parser for endpoint definitions
//!
//! Parses and validates endpoint YAML files.

use crate::error::{Error, Result, ResultExt};
use crate::loader::types::{EndpointDefinition, PaginationDefinition, RequestDefinition};
use crate::pointer::{Scope, ScopedPointer};
use crate::request::template;
use crate::types::Method;
use std::fs;
use std::path::Path;
use url::Url;

/// Load an endpoint definition from a YAML file
///
/// # Examples
///
/// ```ignore
/// let endpoint = load_endpoint("./endpoints/list-users.yaml")?;
/// let call = endpoint.api_call(Arc::new(HttpClient::with_config(endpoint.http_config())?))?;
/// ```
pub fn load_endpoint(path: impl AsRef<Path>) -> Result<EndpointDefinition> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read endpoint file '{}'", path.display()))?;
    load_endpoint_from_str(&content)
}

/// Load an endpoint definition from a YAML string
pub fn load_endpoint_from_str(yaml: &str) -> Result<EndpointDefinition> {
    let def: EndpointDefinition =
        serde_yaml::from_str(yaml).context("Failed to parse endpoint YAML")?;

    validate_endpoint(&def)?;
    Ok(def)
}

/// Validate an endpoint definition
fn validate_endpoint(def: &EndpointDefinition) -> Result<()> {
    if def.name.is_empty() {
        return Err(Error::config("Endpoint name cannot be empty"));
    }

    if def.base_url.is_empty() {
        return Err(Error::config("Endpoint base_url cannot be empty"));
    }
    Url::parse(&def.base_url)
        .map_err(|e| Error::invalid_value("base_url", format!("{}: {e}", def.base_url)))?;

    if def.http.rate_limit_rps == Some(0) {
        return Err(Error::invalid_value(
            "http.rate_limit_rps",
            "must be greater than zero",
        ));
    }

    validate_request(&def.name, &def.request)?;

    if let Some(records) = &def.records {
        let pointer = parse_address("records", records)?;
        if pointer.scope() != Scope::ResponseBody {
            return Err(Error::invalid_value(
                "records",
                format!("'{records}' must address {}", Scope::ResponseBody),
            ));
        }
    }

    for (index, pagination) in def.pagination.iter().enumerate() {
        validate_pagination(index, pagination)?;
    }

    Ok(())
}

/// Validate the initial request
fn validate_request(name: &str, request: &RequestDefinition) -> Result<()> {
    if request.path.is_empty() {
        return Err(Error::config(format!(
            "Endpoint '{name}' path cannot be empty"
        )));
    }

    request.method.parse::<Method>().map_err(|_| {
        Error::config(format!(
            "Endpoint '{}' has invalid HTTP method: {}",
            name, request.method
        ))
    })?;

    if request.body.is_some() && !request.form.is_empty() {
        return Err(Error::config(format!(
            "Endpoint '{name}' cannot have both a JSON body and form fields"
        )));
    }

    let undefined: Vec<_> = template::placeholders(&request.path)
        .into_iter()
        .filter(|placeholder| !request.template.contains_key(placeholder))
        .collect();
    if !undefined.is_empty() {
        return Err(Error::undefined_var(undefined.join(", ")));
    }

    Ok(())
}

/// Validate one pagination entry
fn validate_pagination(index: usize, pagination: &PaginationDefinition) -> Result<()> {
    for (field, address, side) in pagination.addresses() {
        let field = format!("pagination[{index}].{field}");
        let pointer = parse_address(&field, address)?;
        if !side.admits(pointer.scope()) {
            return Err(Error::invalid_value(
                field,
                format!("scope {} is not allowed here", pointer.scope()),
            ));
        }
    }

    Ok(())
}

fn parse_address(field: &str, address: &str) -> Result<ScopedPointer> {
    ScopedPointer::parse(address).map_err(|e| Error::invalid_value(field, e.to_string()))
}
