//! Contract ABI documents in the solc JSON format

use serde::Deserialize;

use crate::{AbiError, AbiType, Constructor, Event, Function, Param, StateMutability};

/// A contract interface: its functions, events and constructor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    /// Functions in document order; overloads share a name
    pub functions: Vec<Function>,
    /// Events in document order
    pub events: Vec<Event>,
    /// Constructor, if declared
    pub constructor: Option<Constructor>,
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "type", default = "default_item_type")]
    item_type: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    constant: Option<bool>,
    #[serde(default)]
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    param_type: String,
    #[serde(default)]
    indexed: bool,
    #[serde(default)]
    components: Vec<RawParam>,
}

fn default_item_type() -> String {
    "function".to_string()
}

impl RawParam {
    fn to_param(&self) -> Result<Param, AbiError> {
        Ok(Param {
            name: self.name.clone(),
            kind: self.to_type()?,
            indexed: self.indexed,
        })
    }

    fn to_type(&self) -> Result<AbiType, AbiError> {
        let Some(suffix) = self.param_type.strip_prefix("tuple") else {
            return self.param_type.parse();
        };
        let components = self
            .components
            .iter()
            .map(RawParam::to_type)
            .collect::<Result<Vec<_>, _>>()?;
        wrap_array_suffix(AbiType::Tuple(components), suffix)
    }
}

/// Apply `[]`/`[N]` suffixes left to right, so the last one is outermost
fn wrap_array_suffix(mut ty: AbiType, mut suffix: &str) -> Result<AbiType, AbiError> {
    while !suffix.is_empty() {
        let close = suffix
            .strip_prefix('[')
            .and_then(|rest| rest.find(']'))
            .ok_or_else(|| AbiError::Parse(format!("invalid tuple suffix {:?}", suffix)))?;
        let dim = &suffix[1..close + 1];
        ty = if dim.is_empty() {
            AbiType::Array(Box::new(ty))
        } else {
            let len = dim
                .parse()
                .map_err(|_| AbiError::Parse(format!("invalid array size {:?}", dim)))?;
            AbiType::FixedArray(Box::new(ty), len)
        };
        suffix = &suffix[close + 2..];
    }
    Ok(ty)
}

fn mutability(item: &RawItem) -> StateMutability {
    if let Some(m) = item.state_mutability.as_deref().and_then(StateMutability::from_abi_str) {
        return m;
    }
    // Documents from before solc 0.4.16 only carry the boolean flags
    if item.constant == Some(true) {
        StateMutability::View
    } else if item.payable == Some(true) {
        StateMutability::Payable
    } else {
        StateMutability::NonPayable
    }
}

fn to_params(raw: &[RawParam]) -> Result<Vec<Param>, AbiError> {
    raw.iter().map(RawParam::to_param).collect()
}

impl Abi {
    /// Parse a solc ABI JSON array
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let items: Vec<RawItem> = serde_json::from_str(json)?;
        let mut abi = Abi::default();

        for item in &items {
            match item.item_type.as_str() {
                "function" => abi.functions.push(Function {
                    name: item.name.clone(),
                    inputs: to_params(&item.inputs)?,
                    outputs: to_params(&item.outputs)?,
                    state_mutability: mutability(item),
                }),
                "event" => abi.events.push(Event {
                    name: item.name.clone(),
                    inputs: to_params(&item.inputs)?,
                    anonymous: item.anonymous,
                }),
                "constructor" => {
                    abi.constructor = Some(Constructor {
                        inputs: to_params(&item.inputs)?,
                        state_mutability: mutability(item),
                    })
                }
                // fallback, receive and error entries carry nothing callable here
                _ => {}
            }
        }

        Ok(abi)
    }

    /// First function with this name
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.functions
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| AbiError::UnknownItem {
                kind: "function",
                name: name.to_string(),
            })
    }

    /// All overloads of a function
    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    /// First event with this name
    pub fn event(&self, name: &str) -> Result<&Event, AbiError> {
        self.events
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| AbiError::UnknownItem {
                kind: "event",
                name: name.to_string(),
            })
    }

    /// The standard ERC-20 token interface
    pub fn erc20() -> Self {
        let view = |sig: &str| {
            Function::parse(sig).map(|f| f.with_mutability(StateMutability::View))
        };
        let write = |sig: &str| {
            Function::parse(sig).map(|f| f.with_mutability(StateMutability::NonPayable))
        };

        // Signatures are literals, so parsing cannot fail
        let functions = [
            view("name()(string)"),
            view("symbol()(string)"),
            view("decimals()(uint8)"),
            view("totalSupply()(uint256)"),
            view("balanceOf(address)(uint256)"),
            view("allowance(address,address)(uint256)"),
            write("transfer(address,uint256)(bool)"),
            write("approve(address,uint256)(bool)"),
            write("transferFrom(address,address,uint256)(bool)"),
        ]
        .into_iter()
        .flatten()
        .collect();

        let transfer_like = |name: &str, a: &str, b: &str| {
            Event::new(
                name,
                vec![
                    Param::indexed(a, AbiType::Address),
                    Param::indexed(b, AbiType::Address),
                    Param::new("value", AbiType::Uint(256)),
                ],
            )
        };

        Abi {
            functions,
            events: vec![
                transfer_like("Transfer", "from", "to"),
                transfer_like("Approval", "owner", "spender"),
            ],
            constructor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}],"stateMutability":"nonpayable"},
        {"type":"function","name":"balanceOf","inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"submit","inputs":[
            {"name":"orders","type":"tuple[]","components":[
                {"name":"maker","type":"address"},
                {"name":"amounts","type":"uint128[2]"}
            ]}],"outputs":[]},
        {"constant":true,"name":"legacy","inputs":[],"outputs":[{"name":"","type":"bool"}]},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]},
        {"type":"fallback"}
    ]"#;

    #[test]
    fn test_from_json() {
        let abi = Abi::from_json(ABI).unwrap();
        assert_eq!(abi.functions.len(), 3);
        assert_eq!(abi.events.len(), 1);
        assert_eq!(abi.constructor.as_ref().unwrap().inputs.len(), 1);

        let balance_of = abi.function("balanceOf").unwrap();
        assert!(balance_of.is_constant());
        assert_eq!(balance_of.inputs[0].name, "owner");

        let submit = abi.function("submit").unwrap();
        assert_eq!(submit.signature(), "submit((address,uint128[2])[])");
        assert!(!submit.is_constant());

        assert!(abi.function("legacy").unwrap().is_constant());
        assert_eq!(
            abi.event("Transfer").unwrap().topic(),
            Abi::erc20().event("Transfer").unwrap().topic()
        );
    }

    #[test]
    fn test_unknown_items() {
        let abi = Abi::from_json(ABI).unwrap();
        assert_eq!(
            abi.function("mint").unwrap_err(),
            AbiError::UnknownItem {
                kind: "function",
                name: "mint".to_string()
            }
        );
        assert!(abi.event("Approval").is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Abi::from_json("{"), Err(AbiError::Json(_))));
        let bad_type = r#"[{"type":"function","name":"f","inputs":[{"name":"x","type":"uint7"}]}]"#;
        assert!(matches!(Abi::from_json(bad_type), Err(AbiError::InvalidType(_))));
    }

    #[test]
    fn test_tuple_suffixes() {
        let base = AbiType::Tuple(vec![AbiType::Bool]);
        let ty = wrap_array_suffix(base.clone(), "[2][]").unwrap();
        assert_eq!(ty.to_string(), "(bool)[2][]");
        assert_eq!(wrap_array_suffix(base.clone(), "").unwrap(), base);
        assert!(wrap_array_suffix(base, "[x]").is_err());
    }

    #[test]
    fn test_erc20_interface() {
        let abi = Abi::erc20();
        assert_eq!(abi.functions.len(), 9);
        let transfer = abi.function("transfer").unwrap();
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert!(!transfer.is_constant());
        assert!(abi.function("decimals").unwrap().is_constant());
        assert_eq!(abi.functions_named("approve").count(), 1);
    }
}
