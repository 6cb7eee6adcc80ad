use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

time::serde::format_description!(fecha_iso, Date, "[year]-[month]-[day]");

/// Orden fijo de columnas de la hoja "DATOS". Toda fila exportada y toda
/// coerción de filas preexistentes usa exactamente este esquema.
pub const COLUMNAS: [&str; 17] = [
    "fecha",
    "empresa",
    "ubicacion",
    "area",
    "no_conformidad",
    "descripcion",
    "gravedad",
    "probabilidad",
    "riesgo",
    "categoria",
    "accion",
    "medida",
    "responsable",
    "plazo",
    "estado",
    "normativa",
    "foto_nombre",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Estado {
    Pendiente,
    Cerrada,
}

impl Estado {
    pub const fn as_str(self) -> &'static str {
        match self {
            Estado::Pendiente => "Pendiente",
            Estado::Cerrada => "Cerrada",
        }
    }
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Estado {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendiente" => Ok(Estado::Pendiente),
            "cerrada" => Ok(Estado::Cerrada),
            otro => Err(format!(
                "estado inválido: {otro} (indicá Pendiente o Cerrada)"
            )),
        }
    }
}

/// Un hallazgo registrado durante la recorrida. Inmutable una vez agregado al
/// buffer de la sesión; `riesgo` siempre es `gravedad * probabilidad`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hallazgo {
    #[serde(with = "fecha_iso")]
    pub fecha: Date,
    pub empresa: String,
    pub ubicacion: String,
    pub area: String,
    pub no_conformidad: String,
    pub descripcion: String,
    pub gravedad: u8,
    pub probabilidad: u8,
    pub riesgo: u8,
    pub categoria: Option<String>,
    pub accion: Option<String>,
    pub medida: String,
    pub responsable: String,
    #[serde(default, with = "fecha_iso::option")]
    pub plazo: Option<Date>,
    pub estado: Estado,
    pub normativa: Option<String>,
    pub foto_nombre: Option<String>,
}

impl Hallazgo {
    pub const fn riesgo_de(gravedad: u8, probabilidad: u8) -> u8 {
        gravedad * probabilidad
    }

    /// Valida los invariantes antes de entrar al buffer. Un registro inválido
    /// se rechaza completo; nunca se almacena a medias.
    pub fn validar(&self) -> Result<()> {
        for (campo, valor) in [
            ("empresa", &self.empresa),
            ("ubicacion", &self.ubicacion),
            ("area", &self.area),
            ("no_conformidad", &self.no_conformidad),
        ] {
            if valor.trim().is_empty() {
                bail!("falta el campo obligatorio: {campo}");
            }
        }
        if !(1..=4).contains(&self.gravedad) {
            bail!("gravedad fuera de rango: {} (1-4)", self.gravedad);
        }
        if !(1..=4).contains(&self.probabilidad) {
            bail!("probabilidad fuera de rango: {} (1-4)", self.probabilidad);
        }
        if self.riesgo != Self::riesgo_de(self.gravedad, self.probabilidad) {
            bail!(
                "riesgo inconsistente: {} (se esperaba {} = {} x {})",
                self.riesgo,
                Self::riesgo_de(self.gravedad, self.probabilidad),
                self.gravedad,
                self.probabilidad
            );
        }
        Ok(())
    }

    pub fn fecha_texto(&self) -> String {
        formatear_fecha(self.fecha)
    }

    /// El plazo ausente se serializa como cadena vacía, igual que en la hoja.
    pub fn plazo_texto(&self) -> String {
        self.plazo.map(formatear_fecha).unwrap_or_default()
    }

    /// Fila en el orden de [`COLUMNAS`].
    pub fn fila(&self) -> Vec<String> {
        vec![
            self.fecha_texto(),
            self.empresa.clone(),
            self.ubicacion.clone(),
            self.area.clone(),
            self.no_conformidad.clone(),
            self.descripcion.clone(),
            self.gravedad.to_string(),
            self.probabilidad.to_string(),
            self.riesgo.to_string(),
            self.categoria.clone().unwrap_or_default(),
            self.accion.clone().unwrap_or_default(),
            self.medida.clone(),
            self.responsable.clone(),
            self.plazo_texto(),
            self.estado.to_string(),
            self.normativa.clone().unwrap_or_default(),
            self.foto_nombre.clone().unwrap_or_default(),
        ]
    }
}

pub fn formatear_fecha(fecha: Date) -> String {
    let formato = format_description!("[year]-[month]-[day]");
    fecha
        .format(&formato)
        .unwrap_or_else(|_| fecha.to_string())
}

pub fn parsear_fecha(s: &str) -> Result<Date> {
    let formato = format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &formato)
        .map_err(|_| anyhow::anyhow!("fecha inválida: {s} (formato esperado: AAAA-MM-DD)"))
}
