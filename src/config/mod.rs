use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub informe: InformeConfig,
    pub plantilla: PlantillaConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct InformeConfig {
    /// Razón social por defecto; evita tipearla en cada recorrida.
    pub empresa: Option<String>,
    pub ubicacion: Option<String>,
    /// Desfase horario fijo para "hoy" (San Juan, AR = -3). Sin base de
    /// datos de zonas: el manejo horario es pasamanos.
    pub utc_offset_hours: i8,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlantillaConfig {
    pub path: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            informe: InformeConfig {
                empresa: None,
                ubicacion: None,
                utc_offset_hours: -3,
            },
            plantilla: PlantillaConfig {
                path: None,
                logo: None,
            },
            ui: UiConfig {
                color: true,
                max_table_rows: 20,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    informe: Option<RawInformeConfig>,
    plantilla: Option<RawPlantillaConfig>,
    ui: Option<RawUiConfig>,
}

#[derive(Debug, Deserialize)]
struct RawInformeConfig {
    empresa: Option<String>,
    ubicacion: Option<String>,
    utc_offset_hours: Option<i8>,
}

#[derive(Debug, Deserialize)]
struct RawPlantillaConfig {
    path: Option<String>,
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

pub fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .context("no se pudo determinar el directorio HOME")
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/recorrida/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path).with_context(|| {
            format!("no se pudo leer el archivo de configuración: {}", path.display())
        })?;
        let raw: RawConfig =
            toml::from_str(&s).context("no se pudo interpretar la configuración (TOML)")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    if !(-12..=14).contains(&cfg.informe.utc_offset_hours) {
        anyhow::bail!(
            "utc_offset_hours fuera de rango: {} (-12..=14)",
            cfg.informe.utc_offset_hours
        );
    }

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(informe) = raw.informe {
        if let Some(empresa) = informe.empresa {
            cfg.informe.empresa = Some(empresa);
        }
        if let Some(ubicacion) = informe.ubicacion {
            cfg.informe.ubicacion = Some(ubicacion);
        }
        if let Some(offset) = informe.utc_offset_hours {
            cfg.informe.utc_offset_hours = offset;
        }
    }

    if let Some(plantilla) = raw.plantilla {
        if let Some(path) = plantilla.path {
            cfg.plantilla.path = Some(path);
        }
        if let Some(logo) = plantilla.logo {
            cfg.plantilla.logo = Some(logo);
        }
    }

    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("RECORRIDA_EMPRESA") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.informe.empresa = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("RECORRIDA_UBICACION") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.informe.ubicacion = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("RECORRIDA_UTC_OFFSET") {
        cfg.informe.utc_offset_hours = v
            .trim()
            .parse::<i8>()
            .with_context(|| "RECORRIDA_UTC_OFFSET")?;
    }
    if let Ok(v) = std::env::var("RECORRIDA_PLANTILLA") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.plantilla.path = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("RECORRIDA_LOGO") {
        let v = v.trim();
        if !v.is_empty() {
            cfg.plantilla.logo = Some(v.to_string());
        }
    }
    if let Ok(v) = std::env::var("RECORRIDA_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "RECORRIDA_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("RECORRIDA_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "RECORRIDA_UI_MAX_TABLE_ROWS")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "si" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "valor booleano inválido: {s} (true|false|1|0|si|no|on|off)"
        )),
    }
}
