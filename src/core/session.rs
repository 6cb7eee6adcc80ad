use std::collections::BTreeMap;

use anyhow::Result;

use crate::core::Hallazgo;

/// Estado de una sesión de registro: buffer ordenado de hallazgos más las
/// fotos adjuntas (nombre -> bytes). Vive solo en memoria; si la sesión
/// termina sin exportar, se descarta.
#[derive(Debug, Default)]
pub struct Sesion {
    hallazgos: Vec<Hallazgo>,
    fotos: BTreeMap<String, Vec<u8>>,
}

impl Sesion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valida y agrega al final del buffer. Un registro inválido no se
    /// almacena en absoluto.
    pub fn agregar(&mut self, hallazgo: Hallazgo) -> Result<()> {
        hallazgo.validar()?;
        self.hallazgos.push(hallazgo);
        Ok(())
    }

    pub fn adjuntar_foto(&mut self, nombre: impl Into<String>, bytes: Vec<u8>) {
        self.fotos.insert(nombre.into(), bytes);
    }

    pub fn hallazgos(&self) -> &[Hallazgo] {
        &self.hallazgos
    }

    pub fn fotos(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.fotos
    }

    pub fn len(&self) -> usize {
        self.hallazgos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hallazgos.is_empty()
    }
}
