use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use time::OffsetDateTime;
use time::macros::format_description;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const EXTENSIONES: [&str; 3] = ["jpg", "jpeg", "png"];

/// Nombre estilo captura de cámara, para adjuntos sin nombre utilizable.
pub fn nombre_captura(momento: OffsetDateTime) -> String {
    let formato = format_description!("[year][month][day]_[hour][minute][second]");
    match momento.format(&formato) {
        Ok(marca) => format!("foto_{marca}.jpg"),
        Err(_) => "foto.jpg".to_string(),
    }
}

pub fn es_imagen(ruta: &Path) -> bool {
    ruta.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| EXTENSIONES.contains(&ext.as_str()))
}

/// Empaqueta las fotos adjuntas (nombre -> bytes) en un zip deflate.
pub fn empaquetar(fotos: &BTreeMap<String, Vec<u8>>) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opciones =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (nombre, contenido) in fotos {
        zip.start_file(nombre.as_str(), opciones)
            .with_context(|| format!("no se pudo agregar al zip: {nombre}"))?;
        zip.write_all(contenido)
            .with_context(|| format!("no se pudo escribir en el zip: {nombre}"))?;
    }
    Ok(zip.finish().context("no se pudo cerrar el zip")?.into_inner())
}

/// Junta las imágenes de un directorio (sin recursión, orden alfabético) y
/// las empaqueta.
pub fn empaquetar_directorio(dir: &Path) -> Result<Vec<u8>> {
    let mut fotos = BTreeMap::new();
    let entradas = std::fs::read_dir(dir)
        .with_context(|| format!("no se pudo leer el directorio: {}", dir.display()))?;
    for entrada in entradas {
        let ruta = entrada?.path();
        if !ruta.is_file() || !es_imagen(&ruta) {
            continue;
        }
        let Some(nombre) = ruta.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let bytes = std::fs::read(&ruta)
            .with_context(|| format!("no se pudo leer la foto: {}", ruta.display()))?;
        fotos.insert(nombre.to_string(), bytes);
    }
    if fotos.is_empty() {
        bail!("no hay fotos (jpg/jpeg/png) en {}", dir.display());
    }
    empaquetar(&fotos)
}
