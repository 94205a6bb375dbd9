use msi_results::models::MetricsTableFile;
use msi_results::{
    FsImageStore,
    IonImages,
    MaterializationError,
    MaterializationReport,
    MetricsTable,
    ParquetResultStore,
    ResultMaterializer,
    SpatialMask,
    SqliteResultStore,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{
    info,
    instrument,
};

use crate::cli::{
    MaterializeArgs,
    WriteTemplateArgs,
};
use crate::config::{
    Config,
    ImageStoreConfig,
    ResultStoreConfig,
};
use crate::error::CliError;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let file = std::fs::File::open(path).map_err(|e| CliError::DataReading {
        path: path.display().to_string(),
        msg: e.to_string(),
    })?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| CliError::DataReading {
        path: path.display().to_string(),
        msg: e.to_string(),
    })
}

pub fn read_metrics_table(path: &Path) -> Result<MetricsTable, CliError> {
    let file: MetricsTableFile = read_json(path)?;
    Ok(MetricsTable::try_from(file).map_err(MaterializationError::from)?)
}

pub fn read_mask(path: &Path) -> Result<SpatialMask, CliError> {
    let rows: Vec<Vec<u8>> = read_json(path)?;
    Ok(SpatialMask::from_int_rows(rows).map_err(MaterializationError::from)?)
}

pub fn read_ion_images(path: &Path) -> Result<Vec<IonImages>, CliError> {
    read_json(path)
}

/// Builds the configured stores and runs the pipeline.
pub fn run_materialize(
    config: &Config,
    ions: &[IonImages],
    mask: &SpatialMask,
    table: &MetricsTable,
) -> Result<MaterializationReport, CliError> {
    let materializer = ResultMaterializer::new(config.job.clone())
        .with_layout(config.metrics.clone())
        .with_policy(config.non_finite);

    let image_store = match &config.image_store {
        ImageStoreConfig::Fs { root } => FsImageStore::new(root),
    };

    let report = match &config.result_store {
        ResultStoreConfig::Sqlite { path } => {
            let mut store = SqliteResultStore::open(path).map_err(MaterializationError::from)?;
            store.ensure_schema().map_err(MaterializationError::from)?;
            materializer.materialize(ions, mask, table, &image_store, &mut store)?
        }
        ResultStoreConfig::Parquet { path } => {
            let mut store = ParquetResultStore::new(path);
            materializer.materialize(ions, mask, table, &image_store, &mut store)?
        }
    };
    Ok(report)
}

/// Main function for the 'materialize' subcommand.
#[instrument]
pub fn main_materialize(args: MaterializeArgs) -> Result<(), CliError> {
    let mut config: Config = read_json(&args.config)?;
    config.apply_args(&args);
    info!("Using configuration: {:#?}", config);

    let table = read_metrics_table(&args.metrics)?;
    info!("Loaded {} metrics rows", table.len());
    let ions = read_ion_images(&args.images)?;
    info!("Loaded images of {} ions", ions.len());
    let mask = read_mask(&args.mask)?;

    let report = run_materialize(&config, &ions, &mask, &table)?;
    info!("Report: {}", serde_json::to_string(&report)?);
    Ok(())
}

const CONFIG_TEMPLATE: &str = r#"{
  "job": {
    "job_id": 1,
    "dataset_id": "example_dataset",
    "store_kind": "fs",
    "peak_slots": 4
  },
  "metrics": ["chaos", "spatial", "spectral", "msm", "total_iso_ints", "min_iso_ints", "max_iso_ints"],
  "non_finite": "reject",
  "image_store": { "type": "fs", "root": "iso_images" },
  "result_store": { "type": "sqlite", "path": "results.db" }
}"#;

const METRICS_TEMPLATE: &str = r#"{
  "columns": ["chaos", "spatial", "spectral", "msm", "total_iso_ints", "min_iso_ints", "max_iso_ints", "fdr"],
  "rows": [
    {"formula_i": 0, "formula": "H2O", "adduct": "+H", "values": [0.9, 0.9, 0.9, 0.729, [100, 10], [0, 0], [10, 1], 0.1]},
    {"formula_i": 1, "formula": "C6H12O6", "adduct": "+K", "values": [0.8, 0.5, 0.9, 0.36, [50, 20], [0, 0], [5, 2], 0.5]}
  ]
}"#;

const IMAGES_TEMPLATE: &str = r#"[
  {
    "formula_i": 0,
    "peaks": [
      {"shape": [2, 2], "rows": [0, 0, 1], "cols": [0, 1, 0], "values": [2.0, 3.0, 1.0]},
      null,
      {"shape": [2, 2], "rows": [0], "cols": [0], "values": [0.5]},
      null
    ]
  },
  {
    "formula_i": 1,
    "peaks": [
      {"shape": [2, 2], "rows": [0, 1], "cols": [1, 0], "values": [1.0, 1.0]}
    ]
  }
]"#;

const MASK_TEMPLATE: &str = r#"[
  [1, 1],
  [1, 0]
]"#;

/// Main function for the 'write-template' subcommand.
pub fn main_write_template(args: WriteTemplateArgs) -> Result<(), CliError> {
    let target_dir = args.output_path;
    std::fs::create_dir_all(&target_dir)?;

    let config_path = target_dir.join("config_template.json");
    std::fs::write(&config_path, CONFIG_TEMPLATE)?;
    println!("Wrote config template to: {}", config_path.display());

    let metrics_path = target_dir.join("metrics_template.json");
    let images_path = target_dir.join("images_template.json");
    let mask_path = target_dir.join("mask_template.json");
    std::fs::write(&metrics_path, METRICS_TEMPLATE)?;
    std::fs::write(&images_path, IMAGES_TEMPLATE)?;
    std::fs::write(&mask_path, MASK_TEMPLATE)?;
    println!(
        "Wrote input templates to:\n- {}\n- {}\n- {}",
        metrics_path.display(),
        images_path.display(),
        mask_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn written_templates() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        main_write_template(WriteTemplateArgs {
            output_path: tmp.path().to_path_buf(),
        })
        .unwrap();
        tmp
    }

    #[test]
    fn test_templates_deserialize() {
        let tmp = written_templates();
        let config: Config = read_json(&tmp.path().join("config_template.json")).unwrap();
        assert_eq!(config.job.peak_slots, 4);
        assert_eq!(config.metrics.len(), 7);
        assert!(matches!(config.result_store, ResultStoreConfig::Sqlite { .. }));

        let table = read_metrics_table(&tmp.path().join("metrics_template.json")).unwrap();
        assert_eq!(table.len(), 2);
        let ions = read_ion_images(&tmp.path().join("images_template.json")).unwrap();
        assert_eq!(ions.len(), 2);
        assert_eq!(ions[0].num_present(), 2);
        let mask = read_mask(&tmp.path().join("mask_template.json")).unwrap();
        assert_eq!(mask.num_sampled(), 3);
    }

    #[test]
    fn test_args_override_config() {
        let tmp = written_templates();
        let mut config: Config = read_json(&tmp.path().join("config_template.json")).unwrap();
        config.apply_args(&MaterializeArgs {
            config: PathBuf::new(),
            metrics: PathBuf::new(),
            images: PathBuf::new(),
            mask: PathBuf::new(),
            job_id: Some(99),
            dataset_id: None,
        });
        assert_eq!(config.job.job_id, 99);
        assert_eq!(config.job.dataset_id, "example_dataset");
    }

    #[test]
    fn test_templates_materialize() {
        let tmp = written_templates();
        let mut config: Config = read_json(&tmp.path().join("config_template.json")).unwrap();
        config.image_store = ImageStoreConfig::Fs {
            root: tmp.path().join("iso_images"),
        };
        config.result_store = ResultStoreConfig::Sqlite {
            path: tmp.path().join("results.db"),
        };

        let table = read_metrics_table(&tmp.path().join("metrics_template.json")).unwrap();
        let ions = read_ion_images(&tmp.path().join("images_template.json")).unwrap();
        let mask = read_mask(&tmp.path().join("mask_template.json")).unwrap();

        let report = run_materialize(&config, &ions, &mask, &table).unwrap();
        assert_eq!(report.n_records, 2);
        assert_eq!(report.n_images_posted, 3);

        let store = SqliteResultStore::open(tmp.path().join("results.db")).unwrap();
        assert_eq!(store.count_rows(1).unwrap(), 2);
    }

    #[test]
    fn test_parquet_output_not_overwritten() {
        let tmp = written_templates();
        let mut config: Config = read_json(&tmp.path().join("config_template.json")).unwrap();
        config.image_store = ImageStoreConfig::Fs {
            root: tmp.path().join("iso_images"),
        };
        config.result_store = ResultStoreConfig::Parquet {
            path: tmp.path().join("results.parquet"),
        };
        let table = read_metrics_table(&tmp.path().join("metrics_template.json")).unwrap();
        let ions = read_ion_images(&tmp.path().join("images_template.json")).unwrap();
        let mask = read_mask(&tmp.path().join("mask_template.json")).unwrap();

        run_materialize(&config, &ions, &mask, &table).unwrap();
        assert!(matches!(
            run_materialize(&config, &ions, &mask, &table),
            Err(CliError::Materialization(
                MaterializationError::StoreUnavailable(_)
            ))
        ));
    }
}
