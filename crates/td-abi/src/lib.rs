//! Contract interface descriptors.
//!
//! Descriptors are JSON ABI documents parsed with `alloy-json-abi`; calls are
//! encoded and decoded with `alloy-dyn-abi` so a replacement descriptor only
//! has to declare the functions a handle uses.

use alloy_dyn_abi::{FunctionExt, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use thiserror::Error;

pub use alloy_dyn_abi::DynSolValue;
pub use alloy_json_abi::Function;
pub use alloy_primitives::U256;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid interface descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
    #[error("function `{0}` is not part of the interface")]
    UnknownFunction(String),
    #[error("cannot encode call to `{function}`: {source}")]
    Encode {
        function: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    #[error("cannot decode data of `{function}`: {source}")]
    Decode {
        function: String,
        #[source]
        source: alloy_dyn_abi::Error,
    },
    #[error("call data does not match any declared function")]
    UnknownSelector,
}

/// `uint256` argument.
pub fn uint(value: impl Into<U256>) -> DynSolValue {
    DynSolValue::Uint(value.into(), 256)
}

/// A parsed JSON ABI document.
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        Ok(Self {
            abi: serde_json::from_str(json)?,
        })
    }

    /// First declaration of `name`; overloads are not used by the contracts.
    pub fn function(&self, name: &str) -> Result<&Function, AbiError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| AbiError::UnknownFunction(name.to_owned()))
    }

    /// Fails with the first name in `names` the interface does not declare.
    pub fn require(&self, names: &[&str]) -> Result<(), AbiError> {
        for name in names {
            self.function(name)?;
        }
        Ok(())
    }

    /// Selector followed by the type-checked arguments.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> Result<Vec<u8>, AbiError> {
        self.function(name)?
            .abi_encode_input(args)
            .map_err(|source| AbiError::Encode {
                function: name.to_owned(),
                source,
            })
    }

    pub fn decode_output(&self, name: &str, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        self.function(name)?
            .abi_decode_output(data)
            .map_err(|source| AbiError::Decode {
                function: name.to_owned(),
                source,
            })
    }

    /// Resolves call data back to the declared function and its arguments.
    pub fn decode_call(&self, data: &[u8]) -> Result<(&Function, Vec<DynSolValue>), AbiError> {
        let (selector, args) = data.split_first_chunk::<4>().ok_or(AbiError::UnknownSelector)?;
        let function = self
            .abi
            .functions()
            .find(|f| f.selector().0 == *selector)
            .ok_or(AbiError::UnknownSelector)?;
        let values = function
            .abi_decode_input(args)
            .map_err(|source| AbiError::Decode {
                function: function.name.clone(),
                source,
            })?;
        Ok((function, values))
    }
}
