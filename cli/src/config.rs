use anyhow::{Context, Result, bail};
use directories::BaseDirs;
use log::{debug, info};
use privnote_shared::Expiry;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

use crate::args::NoteArgs;

const ENV_PREFIX: &str = "PRIVNOTE_";
const DEFAULT_FILE_NAME: &str = ".privnote";

/// Settings for one run, resolved from flags, environment, config file and
/// defaults in that order.
pub struct Settings {
    pub expiry: Expiry,
    pub do_not_prompt: bool,
    pub notify_email: String,
    pub notify_reference: String,
    /// Manual password from the environment or config file.
    pub password: Option<Zeroizing<String>>,
    /// `--password` was given: ask on the terminal, overriding `password`.
    pub prompt_password: bool,
    pub file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(args: &NoteArgs) -> Result<Self> {
        let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let vars = prefixed_vars(std::env::vars_os())?;
        Self::resolve_from(args, vars, home.as_deref())
    }

    pub fn resolve_from<I>(args: &NoteArgs, env: I, home: Option<&Path>) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let file_layer = match &args.config_file {
            Some(path) => Layer::from_file(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?,
            None => match home.map(|home| home.join(DEFAULT_FILE_NAME)) {
                Some(path) if path.is_file() => Layer::from_file(&path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?,
                _ => Layer::default(),
            },
        };

        let merged = Layer::from_args(args)
            .or(Layer::from_env(env))
            .or(file_layer);

        let expiry = match merged.expires.as_deref() {
            Some(token) => token.parse::<Expiry>()?,
            None => Expiry::default(),
        };

        let do_not_prompt = match merged.do_not_prompt.as_deref() {
            Some(value) => parse_bool("do_not_prompt", value)?,
            None => false,
        };

        Ok(Self {
            expiry,
            do_not_prompt,
            notify_email: merged.notify_email.unwrap_or_default(),
            notify_reference: merged.notify_reference.unwrap_or_default(),
            password: merged.password.filter(|p| !p.is_empty()),
            prompt_password: args.password,
            file: args.file.clone(),
        })
    }
}

/// Values from a single source. `None` means the source did not set it.
#[derive(Default)]
struct Layer {
    expires: Option<String>,
    do_not_prompt: Option<String>,
    notify_email: Option<String>,
    notify_reference: Option<String>,
    password: Option<Zeroizing<String>>,
}

impl Layer {
    fn from_args(args: &NoteArgs) -> Self {
        Self {
            expires: args.expires.clone(),
            do_not_prompt: args.do_not_prompt.then(|| "true".to_string()),
            notify_email: args.notify_email.clone(),
            notify_reference: args.notify_reference.clone(),
            password: None,
        }
    }

    fn from_env<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(key) = key.strip_prefix(ENV_PREFIX) {
                if !layer.set(key, value) {
                    debug!("Ignoring unknown variable {ENV_PREFIX}{key}");
                }
            }
        }
        layer
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = Zeroizing::new(fs::read_to_string(path)?);
        let layer = Self::parse(&content)?;

        info!("Using config file: {}", path.display());
        Ok(layer)
    }

    /// `key=value` lines. Blank lines and lines starting with `#` are
    /// skipped, an `export ` prefix is allowed and one pair of matching
    /// quotes around the value is removed. Values are taken literally: no
    /// `$VAR` expansion, no escapes, no trailing comments.
    fn parse(content: &str) -> Result<Self> {
        let mut layer = Self::default();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                bail!("line {}: expected `key=value`", index + 1);
            };

            let key = key.trim();
            if !layer.set(key, unquote(value.trim()).to_string()) {
                debug!("Ignoring unknown key `{key}` on line {}", index + 1);
            }
        }
        Ok(layer)
    }

    /// Returns false for keys that mean nothing to us.
    fn set(&mut self, key: &str, value: String) -> bool {
        let key = key.to_ascii_lowercase().replace('-', "_");
        let slot = match key.as_str() {
            "expires" => &mut self.expires,
            "do_not_prompt" => &mut self.do_not_prompt,
            "notify_email" => &mut self.notify_email,
            "notify_reference" => &mut self.notify_reference,
            "password" => {
                self.password = Some(Zeroizing::new(value));
                return true;
            }
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Fill whatever this layer left unset from `lower`.
    fn or(self, lower: Layer) -> Layer {
        Layer {
            expires: self.expires.or(lower.expires),
            do_not_prompt: self.do_not_prompt.or(lower.do_not_prompt),
            notify_email: self.notify_email.or(lower.notify_email),
            notify_reference: self.notify_reference.or(lower.notify_reference),
            password: self.password.or(lower.password),
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Our variables out of the process environment. Other variables are
/// skipped even when they are not valid Unicode.
fn prefixed_vars<I>(vars: I) -> Result<Vec<(String, String)>>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut ours = Vec::new();
    for (key, value) in vars {
        let Some(key) = key.to_str().filter(|key| key.starts_with(ENV_PREFIX)) else {
            continue;
        };
        let Ok(value) = value.into_string() else {
            bail!("environment variable {key} is not valid UTF-8");
        };
        ours.push((key.to_string(), value));
    }
    Ok(ours)
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => bail!("invalid value for {key}: `{value}`, expected true or false"),
    }
}
