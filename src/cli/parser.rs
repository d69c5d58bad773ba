//! Invocation parser and validator
//!
//! [`parse`] binds the tokens that follow a resolved command path against
//! that command's descriptor. Problems with the input never stop the parse:
//! they are collected on the returned [`ParsedInvocation`] so the executor
//! can report all of them at once.

use super::descriptor::{ArgSpec, CommandDescriptor, FlagKind, FlagSpec, StdinMode, Value};
use super::error::InputError;
use super::naming::{canonical_key, dashed};
use super::stdin::{StdinCache, STDIN_SENTINEL};
use std::collections::{HashMap, HashSet};
use strsim::levenshtein;

/// Token that ends flag parsing
pub const END_OF_FLAGS: &str = "--";

/// Values bound for one invocation, plus everything that went wrong
#[derive(Debug, Clone, Default)]
pub struct ParsedInvocation {
    args: HashMap<String, Value>,
    flags: HashMap<String, Value>,
    supplied: HashSet<String>,
    /// Required arguments that were not bound, in declaration order
    pub missing_required_args: Vec<ArgSpec>,
    /// Every input problem found, in the order it was detected
    pub errors: Vec<InputError>,
}

impl ParsedInvocation {
    /// Bound argument by any spelling of its name
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(&canonical_key(name))
    }

    /// Bound flag by any spelling of its name
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(&canonical_key(name))
    }

    /// String argument, if bound
    pub fn string_arg(&self, name: &str) -> Option<&str> {
        self.arg(name).and_then(Value::as_str)
    }

    /// String flag, if bound
    pub fn string_flag(&self, name: &str) -> Option<&str> {
        self.flag(name).and_then(Value::as_str)
    }

    /// Boolean flag; `false` when unbound
    pub fn flag_bool(&self, name: &str) -> bool {
        self.flag(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Integer flag, if bound
    pub fn flag_i64(&self, name: &str) -> Option<i64> {
        self.flag(name).and_then(Value::as_i64)
    }

    /// Argument bytes; covers raw stdin as well as plain strings
    pub fn bytes_arg(&self, name: &str) -> Option<&[u8]> {
        self.arg(name).and_then(Value::as_bytes)
    }

    /// Flag bytes; covers raw stdin as well as plain strings
    pub fn bytes_flag(&self, name: &str) -> Option<&[u8]> {
        self.flag(name).and_then(Value::as_bytes)
    }

    /// Whether the user typed the flag (as opposed to it being defaulted)
    pub fn was_supplied(&self, name: &str) -> bool {
        self.supplied.contains(&canonical_key(name))
    }

    /// All bound arguments by canonical key
    pub fn args(&self) -> &HashMap<String, Value> {
        &self.args
    }

    /// All bound flags by canonical key
    pub fn flags(&self) -> &HashMap<String, Value> {
        &self.flags
    }

    /// Whether the invocation can be handed to a command
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any required argument or flag is missing
    pub fn has_missing_required(&self) -> bool {
        self.errors.iter().any(InputError::is_missing_required)
    }
}

/// One occurrence of a flag on the command line
#[derive(Debug, Clone)]
struct Occurrence {
    /// Key as typed, with its dashes (`-c`, `--content-type`)
    typed: String,
    /// Dashed long key without dashes, when a long form was used
    long: Option<String>,
    value: Option<String>,
    inverted: bool,
}

#[derive(Debug, Clone, Copy)]
struct FlagTarget {
    index: usize,
    inverted: bool,
}

/// Lookup from every key a user can type to the flag it selects
struct FlagTable {
    flags: Vec<FlagSpec>,
    long: HashMap<String, FlagTarget>,
    short: HashMap<char, usize>,
}

impl FlagTable {
    fn new(descriptor: &CommandDescriptor) -> Self {
        let flags = descriptor.effective_flags();
        let mut long = HashMap::new();
        let mut short = HashMap::new();

        for (index, flag) in flags.iter().enumerate() {
            let keys = flag.long_keys();
            let counterpart = if flag.kind == FlagKind::Boolean { keys.get(1).cloned() } else { None };

            for key in keys {
                let inverted = counterpart.as_deref() == Some(key.as_str());
                long.entry(key).or_insert(FlagTarget { index, inverted });
            }
            if let Some(c) = flag.short {
                short.entry(c).or_insert(index);
            }
        }

        Self { flags, long, short }
    }

    fn suggest(&self, typed: &str) -> Option<String> {
        self.long
            .keys()
            .filter(|key| !self.flags[self.long[*key].index].hidden)
            .map(|key| (levenshtein(typed, key), key))
            .filter(|(distance, _)| *distance <= 2)
            .min()
            .map(|(_, key)| key.clone())
    }
}

/// `-5`, `-0.25`: negative numbers are values, not flags
fn looks_like_number(token: &str) -> bool {
    let digits = &token[1..];
    digits.bytes().any(|b| b.is_ascii_digit())
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && digits.bytes().filter(|b| *b == b'.').count() <= 1
}

fn is_flag_token(token: &str) -> bool {
    token.starts_with('-') && token != STDIN_SENTINEL && !looks_like_number(token)
}

/// Parse `tokens` (the invocation minus its command path) against `descriptor`.
pub fn parse(tokens: &[String], descriptor: &CommandDescriptor, stdin: &StdinCache) -> ParsedInvocation {
    let table = FlagTable::new(descriptor);
    let mut parsed = ParsedInvocation::default();
    let mut positionals: Vec<String> = Vec::new();
    let mut occurrences: Vec<Vec<Occurrence>> = vec![Vec::new(); table.flags.len()];

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        i += 1;

        if token == END_OF_FLAGS {
            positionals.extend(tokens[i..].iter().cloned());
            break;
        }
        if !is_flag_token(token) {
            positionals.push(token.clone());
            continue;
        }

        let (name, inline_value) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token.as_str(), None),
        };

        let (target, long) = if let Some(long_name) = name.strip_prefix("--") {
            let key = dashed(long_name);
            match table.long.get(&key) {
                Some(target) => (*target, Some(key)),
                None => {
                    parsed.errors.push(InputError::UnknownFlag {
                        flag: name.to_string(),
                        suggestion: table.suggest(&key),
                    });
                    continue;
                }
            }
        } else {
            let short = name[1..].chars().next();
            match short.filter(|_| name.chars().count() == 2).and_then(|c| table.short.get(&c)) {
                Some(index) => (FlagTarget { index: *index, inverted: false }, None),
                None => {
                    parsed.errors.push(InputError::UnknownFlag {
                        flag: name.to_string(),
                        suggestion: None,
                    });
                    continue;
                }
            }
        };

        let flag = &table.flags[target.index];
        let value = if inline_value.is_some() || !flag.kind.takes_value() {
            inline_value
        } else if i < tokens.len() && !is_flag_token(&tokens[i]) && tokens[i] != END_OF_FLAGS {
            i += 1;
            Some(tokens[i - 1].clone())
        } else {
            None
        };

        occurrences[target.index].push(Occurrence {
            typed: name.to_string(),
            long,
            value,
            inverted: target.inverted,
        });
    }

    bind_positionals(&mut parsed, descriptor, positionals, stdin);

    for (flag, seen) in table.flags.iter().zip(occurrences) {
        bind_flag(&mut parsed, flag, seen, stdin);
    }

    check_exclusivity(&mut parsed, descriptor);

    tracing::debug!(
        command = %descriptor.name,
        args = parsed.args.len(),
        flags = parsed.flags.len(),
        errors = parsed.errors.len(),
        "parsed invocation"
    );
    parsed
}

fn bind_positionals(
    parsed: &mut ParsedInvocation,
    descriptor: &CommandDescriptor,
    positionals: Vec<String>,
    stdin: &StdinCache,
) {
    let mut remaining = positionals.into_iter();

    for arg in &descriptor.args {
        let raw = if arg.catch_all {
            let rest: Vec<String> = remaining.by_ref().collect();
            (!rest.is_empty()).then(|| rest.join(" "))
        } else {
            remaining.next()
        };

        let value = match raw {
            Some(v) if arg.stdin && v == STDIN_SENTINEL => match read_stdin(stdin, arg.stdin_mode, &arg.name) {
                Ok(value) => value,
                Err(e) => {
                    parsed.errors.push(e);
                    continue;
                }
            },
            other => other.map(Value::String),
        };

        match value {
            Some(v) => {
                parsed.args.insert(arg.key(), v);
            }
            None if arg.required => {
                parsed.missing_required_args.push(arg.clone());
                parsed.errors.push(InputError::MissingRequiredArgument {
                    name: arg.name.clone(),
                    description: arg.description.clone(),
                });
            }
            None => {}
        }
    }

    for value in remaining {
        parsed.errors.push(InputError::UnexpectedArgument { value });
    }
}

fn bind_flag(parsed: &mut ParsedInvocation, flag: &FlagSpec, seen: Vec<Occurrence>, stdin: &StdinCache) {
    let name = flag.dashed_name();

    if seen.len() > 1 {
        parsed.errors.push(InputError::FlagProvidedMultipleTimes {
            flag: name,
            keys: seen.into_iter().map(|o| o.typed).collect(),
        });
        return;
    }

    let Some(occurrence) = seen.into_iter().next() else {
        if let Some(default) = &flag.default {
            parsed.flags.insert(flag.key(), default.clone());
        } else if flag.required {
            parsed.errors.push(InputError::MissingRequiredFlag {
                flag: name,
                matcher: None,
                provided_without_value: false,
            });
        }
        return;
    };

    parsed.supplied.insert(flag.key());
    let matcher = occurrence.long.clone().filter(|long| *long != name);

    let value = match flag.kind {
        FlagKind::Boolean => {
            let raw = match occurrence.value.as_deref() {
                None | Some("true") => true,
                Some("false") => false,
                Some(other) => {
                    parsed.errors.push(InputError::InvalidBooleanValue {
                        flag: name,
                        value: other.to_string(),
                    });
                    return;
                }
            };
            Value::Boolean(raw != occurrence.inverted)
        }
        FlagKind::String | FlagKind::Integer => {
            let value = match occurrence.value {
                Some(v) if flag.stdin && v == STDIN_SENTINEL => {
                    match read_stdin(stdin, flag.stdin_mode, &format!("--{}", name)) {
                        Ok(value) => value,
                        Err(e) => {
                            parsed.errors.push(e);
                            return;
                        }
                    }
                }
                other => other.map(Value::String),
            };

            match value.filter(|v| !is_blank(v)) {
                None => {
                    parsed.errors.push(InputError::MissingRequiredFlag {
                        flag: name,
                        matcher,
                        provided_without_value: true,
                    });
                    return;
                }
                Some(Value::String(text)) if flag.kind == FlagKind::Integer => match text.trim().parse::<i64>() {
                    Ok(n) => Value::Integer(n),
                    Err(_) => {
                        parsed.errors.push(InputError::InvalidIntegerValue { flag: name, value: text });
                        return;
                    }
                },
                Some(value) => value,
            }
        }
    };

    if !flag.choices.is_empty() && !flag.choices.contains(&value) {
        parsed.errors.push(InputError::InvalidChoice {
            flag: name,
            value: value.to_string(),
            choices: flag.choice_strings(),
        });
        return;
    }

    parsed.flags.insert(flag.key(), value);
}

/// Captured stdin in the form `mode` asks for; `None` when nothing was piped
fn read_stdin(stdin: &StdinCache, mode: StdinMode, name: &str) -> Result<Option<Value>, InputError> {
    match mode {
        StdinMode::Raw => Ok(stdin.bytes().map(|b| Value::Bytes(b.to_vec()))),
        StdinMode::Stringified => stdin
            .text()
            .map(|text| text.map(|t| Value::String(t.to_string())))
            .map_err(|_| InputError::InvalidStdinEncoding { name: name.to_string() }),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        _ => false,
    }
}

fn check_exclusivity(parsed: &mut ParsedInvocation, descriptor: &CommandDescriptor) {
    let mut reported: HashSet<(String, String)> = HashSet::new();

    for flag in &descriptor.flags {
        let key = flag.key();
        if !parsed.supplied.contains(&key) {
            continue;
        }

        for other_key in descriptor.exclusions_of(flag) {
            if !parsed.supplied.contains(&other_key) {
                continue;
            }
            let pair = if key < other_key {
                (key.clone(), other_key.clone())
            } else {
                (other_key.clone(), key.clone())
            };
            if !reported.insert(pair) {
                continue;
            }

            let other = descriptor
                .find_flag(&other_key)
                .map(FlagSpec::dashed_name)
                .unwrap_or_else(|| dashed(&other_key));
            parsed.errors.push(InputError::MutuallyExclusiveFlags {
                flag: flag.dashed_name(),
                other,
            });
        }
    }
}
