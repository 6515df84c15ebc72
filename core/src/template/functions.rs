use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use md5::Md5;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("expected {expected} argument(s), got {got}")]
    BadArity { expected: &'static str, got: usize },
    #[error("invalid argument: {0}")]
    Invalid(String),
}

type FunctionFn = fn(&[String]) -> Result<String, FunctionError>;

/// Named text-transformation functions available inside templates.
///
/// Every function is pure and deterministic except the documented
/// non-deterministic set: `rand`, `randstr`, `timestamp`, `date`.
pub struct FunctionRegistry {
    map: HashMap<&'static str, FunctionFn>,
}

impl FunctionRegistry {
    pub fn with_builtins() -> Self {
        let mut map: HashMap<&'static str, FunctionFn> = HashMap::new();
        map.insert("md5", fn_md5);
        map.insert("sha256", fn_sha256);
        map.insert("base64", fn_base64);
        map.insert("b64decode", fn_b64decode);
        map.insert("upper", fn_upper);
        map.insert("lower", fn_lower);
        map.insert("trim", fn_trim);
        map.insert("replace", fn_replace);
        map.insert("len", fn_len);
        map.insert("rand", fn_rand);
        map.insert("randstr", fn_randstr);
        map.insert("timestamp", fn_timestamp);
        map.insert("date", fn_date);
        Self { map }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn invoke(&self, name: &str, args: &[String]) -> Result<String, FunctionError> {
        let f = self
            .map
            .get(name)
            .ok_or_else(|| FunctionError::Invalid(format!("unknown function: {name}")))?;
        f(args)
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.map.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn one_arg(args: &[String]) -> Result<&str, FunctionError> {
    match args {
        [a] => Ok(a),
        _ => Err(FunctionError::BadArity {
            expected: "1",
            got: args.len(),
        }),
    }
}

fn fn_md5(args: &[String]) -> Result<String, FunctionError> {
    let s = one_arg(args)?;
    Ok(format!("{:x}", Md5::digest(s.as_bytes())))
}

fn fn_sha256(args: &[String]) -> Result<String, FunctionError> {
    let s = one_arg(args)?;
    Ok(format!("{:x}", Sha256::digest(s.as_bytes())))
}

fn fn_base64(args: &[String]) -> Result<String, FunctionError> {
    Ok(B64.encode(one_arg(args)?.as_bytes()))
}

fn fn_b64decode(args: &[String]) -> Result<String, FunctionError> {
    let bytes = B64
        .decode(one_arg(args)?.as_bytes())
        .map_err(|e| FunctionError::Invalid(format!("base64 decode: {e}")))?;
    String::from_utf8(bytes).map_err(|e| FunctionError::Invalid(format!("utf-8: {e}")))
}

fn fn_upper(args: &[String]) -> Result<String, FunctionError> {
    Ok(one_arg(args)?.to_uppercase())
}

fn fn_lower(args: &[String]) -> Result<String, FunctionError> {
    Ok(one_arg(args)?.to_lowercase())
}

fn fn_trim(args: &[String]) -> Result<String, FunctionError> {
    Ok(one_arg(args)?.trim().to_string())
}

fn fn_replace(args: &[String]) -> Result<String, FunctionError> {
    match args {
        [s, from, to] => Ok(s.replace(from.as_str(), to)),
        _ => Err(FunctionError::BadArity {
            expected: "3",
            got: args.len(),
        }),
    }
}

fn fn_len(args: &[String]) -> Result<String, FunctionError> {
    Ok(one_arg(args)?.chars().count().to_string())
}

fn fn_rand(args: &[String]) -> Result<String, FunctionError> {
    let (min, max) = match args {
        [min, max] => {
            let min: i64 = min
                .parse()
                .map_err(|_| FunctionError::Invalid(format!("not an integer: {min}")))?;
            let max: i64 = max
                .parse()
                .map_err(|_| FunctionError::Invalid(format!("not an integer: {max}")))?;
            (min, max)
        }
        [] => (0, i64::MAX),
        _ => {
            return Err(FunctionError::BadArity {
                expected: "0 or 2",
                got: args.len(),
            })
        }
    };
    if min > max {
        return Err(FunctionError::Invalid(format!("empty range {min}..{max}")));
    }
    Ok(rand::thread_rng().gen_range(min..=max).to_string())
}

fn fn_randstr(args: &[String]) -> Result<String, FunctionError> {
    let len: usize = match args {
        [] => 12,
        [n] => n
            .parse()
            .map_err(|_| FunctionError::Invalid(format!("not a length: {n}")))?,
        _ => {
            return Err(FunctionError::BadArity {
                expected: "0 or 1",
                got: args.len(),
            })
        }
    };
    let s: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect();
    Ok(s)
}

fn fn_timestamp(args: &[String]) -> Result<String, FunctionError> {
    if !args.is_empty() {
        return Err(FunctionError::BadArity {
            expected: "0",
            got: args.len(),
        });
    }
    Ok(chrono::Utc::now().timestamp().to_string())
}

fn fn_date(args: &[String]) -> Result<String, FunctionError> {
    use chrono::format::{Item, StrftimeItems};

    let fmt = match args {
        [] => "%Y-%m-%d",
        [f] => f.as_str(),
        _ => {
            return Err(FunctionError::BadArity {
                expected: "0 or 1",
                got: args.len(),
            })
        }
    };
    // Rendering a DelayedFormat panics on unrecognized specifiers, so the
    // format string is parsed and checked before any formatting happens.
    let items: Vec<Item> = StrftimeItems::new(fmt).collect();
    if items.contains(&Item::Error) {
        return Err(FunctionError::Invalid(format!("bad date format: {fmt}")));
    }
    Ok(chrono::Utc::now()
        .format_with_items(items.into_iter())
        .to_string())
}
