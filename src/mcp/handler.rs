//! # MCP Handler Module
//!
//! This module implements the Model Context Protocol (MCP) dispatch for the
//! explorer server. It handles incoming MCP requests and routes them to the
//! explorer client.
//!
//! ## Supported Tools
//!
//! - `get_balance` - Native currency balance of an address
//! - `get_transactions` - Recent transactions for an address
//! - `get_token_transfers` - Recent ERC-20 transfers for an address
//! - `get_contract_abi` - ABI of a verified contract
//! - `get_gas_oracle` - Current safe/propose/fast gas prices
//! - `get_ens_name` - Reverse ENS lookup (Ethereum only)
//! - `list_networks` - Supported networks and their usability

use chrono::DateTime;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::explorer::models::{EnsLookup, ExplorerError};
use crate::explorer::network::Network;
use crate::mcp::protocol::{error_codes, Request, Response};
use crate::{utils, AppState};

/// Produce a result Value that always contains a text content array and
/// preserves structured data for JSON-friendly clients.
fn make_tool_result(text: String, payload: Value) -> Value {
    let content = json!([{ "type": "text", "text": text }]);
    match payload {
        Value::Object(mut map) => {
            // Do not overwrite if caller already set content
            if !map.contains_key("content") {
                map.insert("content".into(), content);
            }
            Value::Object(map)
        }
        other => json!({
            "data": other,
            "content": content
        }),
    }
}

/// Maps a classified explorer failure onto a JSON-RPC error response.
/// Caller mistakes (bad address, unusable network) are invalid params;
/// everything upstream-side is an internal error.
fn explorer_error_response(req_id: &Value, err: ExplorerError) -> Response {
    let code = match err {
        ExplorerError::InvalidAddress { .. } | ExplorerError::NetworkUnavailable { .. } => {
            error_codes::INVALID_PARAMS
        }
        ExplorerError::Upstream(_) => error_codes::INTERNAL_ERROR,
    };
    Response::error(req_id.clone(), code, err.to_string())
}

/// Resolves the optional `network` argument, rejecting unknown tags before
/// any work happens.
fn get_network_arg(args: &Value, req_id: &Value) -> Result<Option<Network>, Response> {
    let tag: Option<String> = utils::get_optional_arg(args, "network", req_id)?;
    match tag {
        None => Ok(None),
        Some(tag) => tag.parse::<Network>().map(Some).map_err(|e| {
            Response::error(req_id.clone(), error_codes::INVALID_PARAMS, e.to_string())
        }),
    }
}

/// The caller-facing bound on `limit`; the client itself only truncates.
fn get_limit_arg(args: &Value, req_id: &Value) -> Result<usize, Response> {
    let limit: Option<u64> = utils::get_optional_arg(args, "limit", req_id)?;
    let limit = limit.unwrap_or(10);
    if !(1..=100).contains(&limit) {
        return Err(Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("'limit' must be between 1 and 100, got {}", limit),
        ));
    }
    Ok(limit as usize)
}

fn format_timestamp(ts: u64) -> String {
    DateTime::from_timestamp(ts as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// This is the main dispatcher for all incoming MCP requests.
pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        // Convenience aliases to support direct method calls from CLI.
        // They are rewritten into tools/call internally to reuse the same logic.
        "get_balance"
        | "get_transactions"
        | "get_token_transfers"
        | "get_contract_abi"
        | "get_gas_oracle"
        | "get_ens_name"
        | "list_networks" => {
            let name = req.method.clone();
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": name,
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name.to_string(),
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args).clone();
    let req_id = &req.id;
    let explorer = &state.explorer;

    match tool_name.as_str() {
        "get_balance" => {
            let res: Result<Response, Response> = (async {
                let address = utils::get_required_arg::<String>(&args, "address", req_id)?;
                let network = get_network_arg(&args, req_id)?;
                let balance = explorer
                    .get_balance(&address, network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                let text = format!(
                    "Balance of {} on {}: {} {}",
                    balance.address,
                    balance.network.config().display_name,
                    balance.formatted,
                    balance.symbol
                );
                let payload = serde_json::to_value(&balance).unwrap_or_else(|_| json!({}));
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "get_transactions" => {
            let res: Result<Response, Response> = (async {
                let address = utils::get_required_arg::<String>(&args, "address", req_id)?;
                let network = get_network_arg(&args, req_id)?;
                let limit = get_limit_arg(&args, req_id)?;
                let resolved = explorer.resolve(network);
                let records = explorer
                    .get_transactions(&address, limit, network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                let symbol = resolved.config().symbol;
                let text = if records.is_empty() {
                    format!(
                        "No transactions found for {} on {}",
                        address,
                        resolved.config().display_name
                    )
                } else {
                    let mut lines = vec![format!(
                        "Latest {} transaction(s) for {} on {}:",
                        records.len(),
                        address,
                        resolved.config().display_name
                    )];
                    for tx in &records {
                        lines.push(format!(
                            "{} | {} -> {} | {} {} | {} | block {}",
                            tx.hash,
                            tx.from,
                            tx.to,
                            tx.value,
                            symbol,
                            format_timestamp(tx.timestamp),
                            tx.block_number
                        ));
                    }
                    lines.join("\n")
                };
                let payload = json!({
                    "network": resolved,
                    "address": address,
                    "transactions": records,
                });
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "get_token_transfers" => {
            let res: Result<Response, Response> = (async {
                let address = utils::get_required_arg::<String>(&args, "address", req_id)?;
                let network = get_network_arg(&args, req_id)?;
                let limit = get_limit_arg(&args, req_id)?;
                let resolved = explorer.resolve(network);
                let records = explorer
                    .get_token_transfers(&address, limit, network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                let text = if records.is_empty() {
                    format!(
                        "No token transfers found for {} on {}",
                        address,
                        resolved.config().display_name
                    )
                } else {
                    let mut lines = vec![format!(
                        "Latest {} token transfer(s) for {} on {}:",
                        records.len(),
                        address,
                        resolved.config().display_name
                    )];
                    for transfer in &records {
                        lines.push(format!(
                            "{} ({}) | {} -> {} | {} {} | {} | block {}",
                            transfer.token_name,
                            transfer.token,
                            transfer.from,
                            transfer.to,
                            transfer.value,
                            transfer.token_symbol,
                            format_timestamp(transfer.timestamp),
                            transfer.block_number
                        ));
                    }
                    lines.join("\n")
                };
                let payload = json!({
                    "network": resolved,
                    "address": address,
                    "transfers": records,
                });
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "get_contract_abi" => {
            let res: Result<Response, Response> = (async {
                let address = utils::get_required_arg::<String>(&args, "address", req_id)?;
                let network = get_network_arg(&args, req_id)?;
                let resolved = explorer.resolve(network);
                let abi = explorer
                    .get_contract_abi(&address, network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                let text = format!(
                    "Contract ABI for {} on {}:\n{}",
                    address,
                    resolved.config().display_name,
                    abi
                );
                let payload = json!({
                    "network": resolved,
                    "address": address,
                    "abi": abi,
                });
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "get_gas_oracle" => {
            let res: Result<Response, Response> = (async {
                let network = get_network_arg(&args, req_id)?;
                let resolved = explorer.resolve(network);
                let gas = explorer
                    .get_gas_oracle(network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                let text = format!(
                    "Gas prices on {}: safe {} gwei, standard {} gwei, fast {} gwei",
                    resolved.config().display_name,
                    gas.safe,
                    gas.propose,
                    gas.fast
                );
                let payload = json!({
                    "network": resolved,
                    "gas": gas,
                });
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "get_ens_name" => {
            let res: Result<Response, Response> = (async {
                let address = utils::get_required_arg::<String>(&args, "address", req_id)?;
                let network = get_network_arg(&args, req_id)?;
                let lookup = explorer
                    .get_ens_name(&address, network)
                    .await
                    .map_err(|e| explorer_error_response(req_id, e))?;
                // All three outcomes are successful tool results; the texts
                // keep "no name" and "no ENS here" distinguishable.
                let (text, payload) = match lookup {
                    EnsLookup::Found(name) => (
                        format!("{} resolves to {}", address, name),
                        json!({ "outcome": "found", "name": name }),
                    ),
                    EnsLookup::NotFound => (
                        format!("No ENS name registered for {}", address),
                        json!({ "outcome": "not_found" }),
                    ),
                    EnsLookup::NotSupported(network) => (
                        format!(
                            "ENS lookups are not supported on {}",
                            network.config().display_name
                        ),
                        json!({ "outcome": "not_supported", "network": network }),
                    ),
                };
                Ok(Response::success(
                    req_id.clone(),
                    make_tool_result(text, payload),
                ))
            })
            .await;
            res.unwrap_or_else(|err_resp| err_resp)
        }
        "list_networks" => {
            let networks: Vec<Value> = Network::ALL
                .into_iter()
                .map(|network| {
                    let cfg = network.config();
                    json!({
                        "network": network,
                        "name": cfg.display_name,
                        "symbol": cfg.symbol,
                        "supports_ens": cfg.supports_ens,
                        "usable": explorer.is_usable(Some(network)),
                        "default": network == explorer.default_network(),
                    })
                })
                .collect();
            let text = Network::ALL
                .into_iter()
                .map(|n| {
                    format!(
                        "{} ({}){}",
                        n.tag(),
                        n.config().display_name,
                        if explorer.is_usable(Some(n)) {
                            ""
                        } else {
                            " [no API key]"
                        }
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            Response::success(
                req_id.clone(),
                make_tool_result(
                    format!("Supported networks: {}", text),
                    json!({ "networks": networks }),
                ),
            )
        }
        other => {
            error!("Unknown tool requested: {}", other);
            Response::error(
                req_id.clone(),
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", other),
            )
        }
    }
}

fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "explorer_mcp",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({ "tools": { "listChanged": false } });
    let instructions =
        "Blockchain explorer MCP server for balances, transaction history, token transfers, contract ABIs, gas prices, and ENS lookups across multiple networks.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let address_schema = json!({
        "type": "string",
        "pattern": "^0x[a-fA-F0-9]{40}$",
        "description": "The 0x-prefixed, 40-hex-character account address."
    });
    let network_schema = json!({
        "type": "string",
        "enum": ["ethereum", "sonic", "base"],
        "description": "Target network. Defaults to the server's configured network."
    });
    let limit_schema = json!({
        "type": "integer",
        "minimum": 1,
        "maximum": 100,
        "default": 10,
        "description": "Maximum number of rows to return."
    });

    let tools = json!([
        {
            "name": "get_balance",
            "description": "Get the native currency balance of an address.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": address_schema.clone(),
                    "network": network_schema.clone()
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "get_transactions",
            "description": "Get the most recent transactions for an address, newest first.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": address_schema.clone(),
                    "limit": limit_schema.clone(),
                    "network": network_schema.clone()
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "get_token_transfers",
            "description": "Get the most recent ERC-20 token transfers for an address, newest first.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": address_schema.clone(),
                    "limit": limit_schema.clone(),
                    "network": network_schema.clone()
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "get_contract_abi",
            "description": "Get the ABI of a verified contract. Fails if the contract is not verified on the explorer.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": address_schema.clone(),
                    "network": network_schema.clone()
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "get_gas_oracle",
            "description": "Get the current safe/standard/fast gas prices in gwei.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "network": network_schema.clone()
                },
                "additionalProperties": false
            }
        },
        {
            "name": "get_ens_name",
            "description": "Reverse-resolve the ENS name of an address. Only supported on Ethereum mainnet.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": address_schema.clone(),
                    "network": network_schema.clone()
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "list_networks",
            "description": "List the supported networks, their native currency symbols, and whether each has a usable API key.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        },
    ]);
    Response::success(req.id.clone(), json!({ "tools": tools }))
}
