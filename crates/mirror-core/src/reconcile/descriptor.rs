//! The scope descriptor written into every metadata marker directory

use mirror_fs::sanitize_segment;
use serde::Serialize;

use crate::Result;
use crate::scope::{ScopeKind, ScopeNode};

const PARAMETERS_SCHEMA: &str =
    "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#";

/// File name of a scope's descriptor, e.g.
/// `Microsoft.Management-managementGroups_corp.parameters.json`.
pub fn descriptor_file_name(node: &ScopeNode) -> String {
    format!(
        "{}-{}_{}.parameters.json",
        node.kind.provider(),
        node.kind.type_name(),
        sanitize_segment(&node.name)
    )
}

/// File name the previous layout used for a management group descriptor.
/// Finding it below a state root means the layout must be rebuilt from
/// scratch.
pub fn legacy_descriptor_file_name(management_group: &str) -> String {
    format!(
        "{}_{}-{}.parameters.json",
        ScopeKind::ManagementGroup.provider(),
        ScopeKind::ManagementGroup.type_name(),
        management_group
    )
}

#[derive(Serialize)]
struct Parameters<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    #[serde(rename = "contentVersion")]
    content_version: &'static str,
    parameters: Input<'a>,
}

#[derive(Serialize)]
struct Input<'a> {
    input: InputValue<'a>,
}

#[derive(Serialize)]
struct InputValue<'a> {
    value: Resource<'a>,
}

#[derive(Serialize)]
struct Resource<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    resource_type: String,
    properties: Properties<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Properties<'a> {
    display_name: &'a str,
    parent_id: Option<&'a str>,
}

/// Render the descriptor for `node`.
///
/// Output depends only on the node's own fields, so unchanged scopes
/// produce byte-identical files.
pub fn render_descriptor(node: &ScopeNode) -> Result<String> {
    let document = Parameters {
        schema: PARAMETERS_SCHEMA,
        content_version: "1.0.0.0",
        parameters: Input {
            input: InputValue {
                value: Resource {
                    id: &node.id,
                    name: &node.name,
                    resource_type: node.kind.resource_type(),
                    properties: Properties {
                        display_name: &node.display_name,
                        parent_id: node.parent_id.as_deref(),
                    },
                },
            },
        },
    };
    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}
