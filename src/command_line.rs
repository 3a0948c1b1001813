use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use std::io::{self, Write};
use tracing::info;

use tv_schedule_crud::api::{Api, Request, Response};
use tv_schedule_crud::dynamodb::{FieldType, Schema};

/// Runs the interactive driver for the schedule.
///
/// Every command is turned into a [`Request`] and handed to the same
/// [`Api::dispatch`] a deployed function would use, so the driver exercises the
/// real request path. The supported commands are:
/// - list: List the schedule, optionally for one channel
/// - get: Show one entry
/// - create: Add an entry, prompting for each schema field
/// - update: Change some fields of an entry
/// - delete: Remove an entry
/// - invoke: Paste a raw JSON event
/// - info: Print the table and schema
/// - exit: Exit the program
///
/// # Arguments
///
/// * `api` - The request router, bound to the process-wide store
/// * `table_name` - The table being served, for display
/// * `schema` - The fields to prompt for
pub async fn run(api: &Api<'_>, table_name: &str, schema: &Schema) -> Result<()> {
    loop {
        let command = prompt(
            "Enter command (list/get/create/update/delete/invoke/info/exit)",
            None,
        )?;
        let request = match command.as_str() {
            "list" => list_request(api)?,
            "get" => get_request(api)?,
            "create" => create_request(schema)?,
            "update" => update_request(api, schema)?,
            "delete" => match delete_request(api)? {
                Some(request) => request,
                None => {
                    println!("Deletion cancelled.");
                    continue;
                }
            },
            "invoke" => match invoke_request() {
                Ok(request) => request,
                Err(e) => {
                    println!("Invalid event: {e}");
                    continue;
                }
            },
            "info" => {
                print_info(api, table_name, schema);
                continue;
            }
            "exit" => break,
            _ => {
                println!("Unknown command. Please try again.");
                continue;
            }
        };

        let response = api.dispatch(&request).await;
        print_response(&response);
    }
    Ok(())
}

fn print_info(api: &Api<'_>, table_name: &str, schema: &Schema) {
    println!("\n--- Table Information ---");
    println!("Table Name: {}", table_name);
    println!("Identifier: {}", api.id_field());
    println!("Schema:");
    for (field, field_type) in schema.fields() {
        println!("  {}: {:?}", field, field_type);
    }
    println!("-------------------------\n");
}

fn list_request(api: &Api<'_>) -> Result<Request> {
    let request = Request::new("GET");
    let filter = prompt_optional(
        &format!("Filter by {} (or press Enter for all)", api.filter_field()),
        None,
    )?;
    Ok(match filter {
        Some(value) => request.with_query_parameter(api.filter_field(), value),
        None => request,
    })
}

fn get_request(api: &Api<'_>) -> Result<Request> {
    let id = prompt(&format!("Enter {}", api.id_field()), None)?;
    Ok(Request::new("GET").with_path_parameter(api.id_field(), id))
}

/// Prompts for every schema field. Leaving a field empty omits it.
fn create_request(schema: &Schema) -> Result<Request> {
    let mut fields = Map::new();
    for (field_name, field_type) in schema.fields() {
        if let Some(value) = prompt_value(field_name, *field_type)? {
            fields.insert(field_name.clone(), value);
        }
    }
    Ok(Request::new("POST").with_body(Value::Object(fields).to_string()))
}

/// Prompts for the fields to change, skipping the ones the user declines.
fn update_request(api: &Api<'_>, schema: &Schema) -> Result<Request> {
    let id = prompt(&format!("Enter {}", api.id_field()), None)?;
    let mut fields = Map::new();
    for (field_name, field_type) in schema.fields() {
        if prompt_bool(&format!("Update {}?", field_name), false)? {
            if let Some(value) = prompt_value(field_name, *field_type)? {
                fields.insert(field_name.clone(), value);
            }
        }
    }
    Ok(Request::new("PATCH")
        .with_path_parameter(api.id_field(), id)
        .with_body(Value::Object(fields).to_string()))
}

fn delete_request(api: &Api<'_>) -> Result<Option<Request>> {
    let id = prompt(&format!("Enter {}", api.id_field()), None)?;
    if !prompt_bool(&format!("Delete '{}'? This cannot be undone.", id), false)? {
        return Ok(None);
    }
    Ok(Some(
        Request::new("DELETE").with_path_parameter(api.id_field(), id),
    ))
}

fn invoke_request() -> Result<Request> {
    let event = prompt(
        "Paste event JSON",
        Some(r#"{"httpMethod":"GET","queryStringParameters":{"channel":"ITV"}}"#),
    )?;
    serde_json::from_str(&event).map_err(|e| anyhow!(e))
}

fn print_response(response: &Response) {
    println!("\n--- {} ---", response.status_code);
    match response.json_body() {
        Ok(Value::Null) => {}
        Ok(body) => match serde_json::to_string_pretty(&body) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", response.body),
        },
        Err(_) => println!("{}", response.body),
    }
    println!("---------\n");
    info!("Response status {}", response.status_code);
}

/// Keeps asking until the input parses as `field_type`; empty input means "no value".
fn prompt_value(field_name: &str, field_type: FieldType) -> Result<Option<Value>> {
    loop {
        let input = prompt(
            &format!("Enter {} ({:?}, Enter to skip)", field_name, field_type),
            None,
        )?;
        if input.is_empty() {
            return Ok(None);
        }
        match field_type.parse(&input) {
            Some(value) => return Ok(Some(value)),
            None => println!("'{}' is not a valid {:?}", input, field_type),
        }
    }
}

/// Prompts the user for input and returns the entered string.
fn prompt(message: &str, example: Option<&str>) -> Result<String> {
    let full_message = if let Some(ex) = example {
        format!("{} (e.g., {}): ", message, ex)
    } else {
        format!("{}: ", message)
    };
    print!("{}", full_message);
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(anyhow!("stdin closed"));
    }
    Ok(input.trim().to_string())
}

fn prompt_optional(message: &str, example: Option<&str>) -> Result<Option<String>> {
    let input = prompt(message, example)?;
    Ok(if input.is_empty() { None } else { Some(input) })
}

fn prompt_bool(message: &str, default: bool) -> Result<bool> {
    let input = prompt(
        &format!("{} (y/n)", message),
        Some(if default { "y" } else { "n" }),
    )?;
    Ok(input.to_lowercase().starts_with('y') || (input.is_empty() && default))
}
