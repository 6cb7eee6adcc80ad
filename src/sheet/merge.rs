use std::io::Cursor;

use anyhow::{Result, anyhow};
use calamine::{Data, Reader, Xlsx};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::core::{COLUMNAS, Hallazgo};

/// Hoja de registro normalizado. Todo lo demás del libro es opaco y debe
/// sobrevivir la fusión sin cambios.
pub const HOJA_DATOS: &str = "DATOS";

/// Fusiona los hallazgos nuevos en un libro: primero las filas preexistentes
/// de "DATOS" (en su orden original), después las nuevas (en orden de carga).
/// Si no hay libro, crea uno con "DATOS" como única hoja. El libro existente
/// se abre tal cual y solo se reemplaza la hoja "DATOS"; las demás hojas se
/// reescriben desde la estructura leída, no desde cero.
pub fn combinar_datos(libro: Option<&[u8]>, hallazgos: &[Hallazgo]) -> Result<Vec<u8>> {
    let nuevas: Vec<Vec<String>> = hallazgos.iter().map(Hallazgo::fila).collect();
    match libro {
        Some(bytes) => anexar_a_libro(bytes, &nuevas),
        None => crear_libro(&nuevas),
    }
}

fn anexar_a_libro(bytes: &[u8], nuevas: &[Vec<String>]) -> Result<Vec<u8>> {
    let existentes = filas_existentes(bytes)?;

    let mut libro = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
        .map_err(|e| anyhow!("no se pudo abrir el libro existente: {e:?}"))?;
    let posicion = libro
        .get_sheet_collection()
        .iter()
        .position(|hoja| hoja.get_name() == HOJA_DATOS);
    if posicion.is_some() {
        libro
            .remove_sheet_by_name(HOJA_DATOS)
            .map_err(|e| anyhow!("no se pudo reemplazar la hoja {HOJA_DATOS}: {e}"))?;
    }
    let hoja = libro
        .new_sheet(HOJA_DATOS)
        .map_err(|e| anyhow!("no se pudo crear la hoja {HOJA_DATOS}: {e}"))?;
    escribir_datos(hoja, existentes.iter().chain(nuevas.iter()));

    // La hoja regenerada vuelve a su posición original para que el orden de
    // hojas del libro sobreviva la fusión.
    if let Some(indice) = posicion {
        let hojas = libro.get_sheet_collection_mut();
        if let Some(regenerada) = hojas.pop() {
            hojas.insert(indice, regenerada);
        }
    }

    serializar(&libro)
}

fn crear_libro(nuevas: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut libro = umya_spreadsheet::new_file_empty_worksheet();
    let hoja = libro
        .new_sheet(HOJA_DATOS)
        .map_err(|e| anyhow!("no se pudo crear la hoja {HOJA_DATOS}: {e}"))?;
    escribir_datos(hoja, nuevas.iter());
    serializar(&libro)
}

/// Filas de la hoja "DATOS" de un libro existente, ya coercionadas al esquema
/// fijo: las columnas se emparejan por nombre de encabezado, las columnas de
/// origen sin correspondencia se descartan y las del esquema sin origen
/// quedan vacías. Un libro ilegible es error duro; una hoja "DATOS" ausente
/// equivale a una hoja vacía.
fn filas_existentes(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut libro = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| anyhow!("el libro existente no es un .xlsx legible: {e}"))?;
    if !libro.sheet_names().iter().any(|n| n == HOJA_DATOS) {
        return Ok(Vec::new());
    }
    let rango = libro
        .worksheet_range(HOJA_DATOS)
        .map_err(|e| anyhow!("no se pudo leer la hoja {HOJA_DATOS}: {e}"))?;

    let mut filas = rango.rows();
    let Some(encabezados) = filas.next() else {
        return Ok(Vec::new());
    };
    let encabezados: Vec<String> = encabezados.iter().map(celda_texto).collect();
    let indices: Vec<Option<usize>> = COLUMNAS
        .iter()
        .map(|nombre| encabezados.iter().position(|h| h == nombre))
        .collect();

    Ok(filas
        .map(|fila| {
            indices
                .iter()
                .map(|idx| {
                    idx.and_then(|i| fila.get(i))
                        .map(celda_texto)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect())
}

fn escribir_datos<'a>(hoja: &mut Worksheet, filas: impl Iterator<Item = &'a Vec<String>>) {
    for (c, nombre) in COLUMNAS.iter().enumerate() {
        hoja.get_cell_mut((c as u32 + 1, 1)).set_value(*nombre);
    }
    for (r, fila) in filas.enumerate() {
        for (c, valor) in fila.iter().enumerate() {
            if !valor.is_empty() {
                hoja.get_cell_mut((c as u32 + 1, r as u32 + 2))
                    .set_value(valor.as_str());
            }
        }
    }
}

fn serializar(libro: &Spreadsheet) -> Result<Vec<u8>> {
    let mut salida = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(libro, &mut salida)
        .map_err(|e| anyhow!("no se pudo escribir el libro: {e:?}"))?;
    Ok(salida.into_inner())
}

/// Texto canónico de una celda leída: strings recortados, flotantes enteros
/// sin parte decimal, celdas vacías o de error como cadena vacía.
fn celda_texto(celda: &Data) -> String {
    match celda {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Empty | Data::Error(_) => String::new(),
    }
}
