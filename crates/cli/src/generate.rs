use clap::Args;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use fetchgen_core::GenerateOptions;
use fetchgen_core::runtime::RUNTIME_FILES;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// OpenAPI document (JSON or YAML)
    #[arg(value_name = "SPEC_PATH")]
    pub spec_path: PathBuf,

    /// Output file; the module is printed to stdout when omitted
    #[arg(value_name = "OUTPUT_PATH")]
    pub output_path: Option<PathBuf>,

    /// Only keep operations with this tag (repeatable)
    #[arg(long, value_name = "TAG")]
    pub include: Vec<String>,

    /// Drop operations with this tag (repeatable)
    #[arg(long, value_name = "TAG")]
    pub exclude: Vec<String>,

    /// Return success payloads directly and throw on other statuses
    #[arg(long)]
    pub optimistic: bool,

    /// Emit `enum` declarations instead of literal unions
    #[arg(long = "useEnumType")]
    pub use_enum_type: bool,

    /// One type per schema, ignoring readOnly/writeOnly
    #[arg(long = "mergeReadWriteOnly")]
    pub merge_read_write_only: bool,

    /// Use `unknown` instead of `any`
    #[arg(long = "useUnknown")]
    pub use_unknown: bool,

    /// Type optional properties as `T | undefined`
    #[arg(long = "unionUndefined")]
    pub union_undefined: bool,

    /// Emit every component schema, referenced or not
    #[arg(long = "allSchemas")]
    pub all_schemas: bool,

    /// Module specifier generated code imports the runtime from
    #[arg(long = "runtimeModule", value_name = "SPECIFIER")]
    pub runtime_module: Option<String>,

    /// Also write the runtime sources into this directory
    #[arg(long = "emitRuntime", value_name = "DIR")]
    pub emit_runtime: Option<PathBuf>,

    /// TOML file with a `[generate]` table of options
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    generate: GenerateOptions,
}

pub fn run(args: GenerateArgs) -> i32 {
    match generate_client(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn generate_client(args: &GenerateArgs) -> Result<(), String> {
    let options = resolve_options(args)?;
    tracing::debug!(spec = %args.spec_path.display(), ?options, "Generating client");

    let text = fs::read_to_string(&args.spec_path)
        .map_err(|err| format!("Failed to read {}: {err}", args.spec_path.display()))?;
    let module = fetchgen_core::generate(&text, &options)
        .map_err(|err| format!("Failed to generate client from {}: {err}", args.spec_path.display()))?;

    match &args.output_path {
        Some(path) => write_file(path, &module)?,
        None => print!("{module}"),
    }

    if let Some(dir) = &args.emit_runtime {
        for (name, contents) in RUNTIME_FILES {
            write_file(&dir.join(name), contents)?;
        }
        tracing::debug!(dir = %dir.display(), "Wrote runtime sources");
    }
    Ok(())
}

/// Built-in defaults, then the config file, then flags.
fn resolve_options(args: &GenerateArgs) -> Result<GenerateOptions, String> {
    let mut options = match &args.config {
        Some(path) => load_config(path)?,
        None => GenerateOptions::default(),
    };

    options.include.extend(args.include.iter().cloned());
    options.exclude.extend(args.exclude.iter().cloned());
    options.optimistic |= args.optimistic;
    options.use_enum_type |= args.use_enum_type;
    options.merge_read_write_only |= args.merge_read_write_only;
    options.use_unknown |= args.use_unknown;
    options.union_undefined |= args.union_undefined;
    options.all_schemas |= args.all_schemas;
    if let Some(module) = &args.runtime_module {
        options.runtime_module.clone_from(module);
    }
    Ok(options)
}

fn load_config(path: &Path) -> Result<GenerateOptions, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config file {}: {err}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .map_err(|err| format!("Failed to parse config file {}: {err}", path.display()))?;
    Ok(config.generate)
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create directory {}: {err}", parent.display()))?;
    }
    fs::write(path, contents).map_err(|err| format!("Failed to write {}: {err}", path.display()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args() -> GenerateArgs {
        GenerateArgs {
            spec_path: PathBuf::from("openapi.json"),
            ..GenerateArgs::default()
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let options = resolve_options(&GenerateArgs {
            include: vec!["pets".into()],
            optimistic: true,
            use_enum_type: true,
            runtime_module: Some("@acme/runtime".into()),
            ..args()
        })
        .unwrap();
        assert_eq!(
            options,
            GenerateOptions {
                include: vec!["pets".into()],
                optimistic: true,
                use_enum_type: true,
                runtime_module: "@acme/runtime".into(),
                ..GenerateOptions::default()
            }
        );
    }

    #[test]
    fn test_config_file_is_merged_with_flags() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("fetchgen.toml");
        fs::write(
            &config,
            "[generate]\ninclude = [\"pets\"]\nuse-unknown = true\nruntime-module = \"~/runtime\"\n",
        )
        .unwrap();

        let options = resolve_options(&GenerateArgs {
            include: vec!["users".into()],
            optimistic: true,
            config: Some(config),
            ..args()
        })
        .unwrap();
        assert_eq!(options.include, ["pets", "users"]);
        assert!(options.use_unknown);
        assert!(options.optimistic);
        assert_eq!(options.runtime_module, "~/runtime");
    }

    #[test]
    fn test_unknown_config_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("fetchgen.toml");
        fs::write(&config, "[generate]\nuse-enums = true\n").unwrap();

        let err = resolve_options(&GenerateArgs {
            config: Some(config),
            ..args()
        })
        .unwrap_err();
        assert!(err.starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_write_file_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src/api/client.ts");
        write_file(&path, "export {};\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "export {};\n");
    }
}
