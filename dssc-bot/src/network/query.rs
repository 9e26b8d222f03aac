use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::NetworkClient;
use crate::error::{BotError, BotResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VmQuery<'a> {
    sc_address: &'a str,
    func_name: &'a str,
    args: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    caller: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct IntData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    data: VmOutput,
}

#[derive(Debug, Deserialize)]
struct VmOutput {
    #[serde(rename = "returnData", alias = "ReturnData", default)]
    return_data: Option<Vec<Option<String>>>,
    #[serde(rename = "returnCode", default)]
    return_code: Option<String>,
    #[serde(rename = "returnMessage", default)]
    return_message: Option<String>,
}

/// Split a flat result list into consecutive pairs. Odd lengths are malformed.
pub fn into_pairs(list: Vec<Vec<u8>>) -> BotResult<Vec<(Vec<u8>, Vec<u8>)>> {
    if list.len() % 2 != 0 {
        return Err(BotError::malformed(format!(
            "expected an even number of elements, got {}",
            list.len()
        )));
    }
    let mut iter = list.into_iter();
    let mut pairs = Vec::new();
    while let (Some(first), Some(second)) = (iter.next(), iter.next()) {
        pairs.push((first, second));
    }
    Ok(pairs)
}

impl NetworkClient {
    /// Run a view whose result is a single unsigned integer
    pub async fn query_int(&self, contract: &str, function: &str, args: &[String]) -> BotResult<BigUint> {
        self.query_int_as(contract, function, args, None).await
    }

    pub async fn query_int_as(
        &self,
        contract: &str,
        function: &str,
        args: &[String],
        caller: Option<&str>,
    ) -> BotResult<BigUint> {
        let url = format!("{}/vm-values/int", self.endpoints.proxy);
        let query = VmQuery {
            sc_address: contract,
            func_name: function,
            args,
            caller,
        };
        let result: IntData = self.post_enveloped(&url, &query).await?;
        BigUint::from_str(result.data.trim())
            .map_err(|_| BotError::Query(format!("{}: invalid integer result {:?}", function, result.data)))
    }

    /// Run a view returning a list of raw byte strings
    pub async fn query_bytes(&self, contract: &str, function: &str, args: &[String]) -> BotResult<Vec<Vec<u8>>> {
        let url = format!("{}/vm-values/query", self.endpoints.proxy);
        let query = VmQuery {
            sc_address: contract,
            func_name: function,
            args,
            caller: None,
        };
        let result: QueryData = self.post_enveloped(&url, &query).await?;
        let output = result.data;

        if let Some(code) = output.return_code.as_deref() {
            if !code.is_empty() && code != "ok" {
                return Err(BotError::Query(format!(
                    "{}: {} {}",
                    function,
                    code,
                    output.return_message.unwrap_or_default()
                )));
            }
        }

        output
            .return_data
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item {
                Some(encoded) => STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| BotError::malformed(format!("{}: bad base64 item: {}", function, e))),
                None => Ok(Vec::new()),
            })
            .collect()
    }

    /// [`query_bytes`](Self::query_bytes) for views that return flattened pairs
    pub async fn query_pairs(
        &self,
        contract: &str,
        function: &str,
        args: &[String],
    ) -> BotResult<Vec<(Vec<u8>, Vec<u8>)>> {
        into_pairs(self.query_bytes(contract, function, args).await?)
    }
}
