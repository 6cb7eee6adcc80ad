//! Preguntas guiadas de la recorrida. El prompt sale por stderr y la
//! respuesta entra por stdin, así stdout queda libre para redirigir.

use anyhow::Result;
use time::Date;

use crate::core::{Estado, parsear_fecha};

/// Fin de entrada (Ctrl-D) durante una pregunta. El llamador decide si
/// cierra la sesión con lo que haya.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Respuesta<T> {
    Valor(T),
    Eof,
}

fn leer_linea(prompt: &str) -> Result<Respuesta<String>> {
    use std::io::{BufRead, Write};

    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut entrada = String::new();
    let n = std::io::stdin().lock().read_line(&mut entrada)?;
    if n == 0 {
        let _ = writeln!(stderr);
        return Ok(Respuesta::Eof);
    }
    Ok(Respuesta::Valor(entrada.trim().to_string()))
}

/// Pregunta con valor por defecto; Enter vacío lo acepta.
pub fn preguntar(etiqueta: &str, por_defecto: &str) -> Result<Respuesta<String>> {
    let prompt = if por_defecto.is_empty() {
        format!("{etiqueta}: ")
    } else {
        format!("{etiqueta} [{por_defecto}]: ")
    };
    match leer_linea(&prompt)? {
        Respuesta::Eof => Ok(Respuesta::Eof),
        Respuesta::Valor(v) if v.is_empty() => Ok(Respuesta::Valor(por_defecto.to_string())),
        Respuesta::Valor(v) => Ok(Respuesta::Valor(v)),
    }
}

/// Insiste hasta obtener un valor no vacío.
pub fn preguntar_obligatorio(etiqueta: &str, por_defecto: &str) -> Result<Respuesta<String>> {
    loop {
        match preguntar(etiqueta, por_defecto)? {
            Respuesta::Eof => return Ok(Respuesta::Eof),
            Respuesta::Valor(v) if v.is_empty() => {
                eprintln!("este campo es obligatorio.");
            }
            Respuesta::Valor(v) => return Ok(Respuesta::Valor(v)),
        }
    }
}

/// Campo opcional; Enter vacío devuelve None.
pub fn preguntar_opcional(etiqueta: &str) -> Result<Respuesta<Option<String>>> {
    match leer_linea(&format!("{etiqueta} (opcional): "))? {
        Respuesta::Eof => Ok(Respuesta::Eof),
        Respuesta::Valor(v) if v.is_empty() => Ok(Respuesta::Valor(None)),
        Respuesta::Valor(v) => Ok(Respuesta::Valor(Some(v))),
    }
}

/// Entero 1..=4 (gravedad o probabilidad), con reintento ante valor inválido.
pub fn preguntar_rango(etiqueta: &str, por_defecto: u8) -> Result<Respuesta<u8>> {
    loop {
        match preguntar(&format!("{etiqueta} (1-4)"), &por_defecto.to_string())? {
            Respuesta::Eof => return Ok(Respuesta::Eof),
            Respuesta::Valor(v) => match parsear_rango(&v) {
                Some(n) => return Ok(Respuesta::Valor(n)),
                None => eprintln!("valor inválido: {v} (esperaba un entero entre 1 y 4)"),
            },
        }
    }
}

/// Fecha ISO opcional (plazo de la medida), con reintento.
pub fn preguntar_fecha(etiqueta: &str) -> Result<Respuesta<Option<Date>>> {
    loop {
        match leer_linea(&format!("{etiqueta} (AAAA-MM-DD, opcional): "))? {
            Respuesta::Eof => return Ok(Respuesta::Eof),
            Respuesta::Valor(v) if v.is_empty() => return Ok(Respuesta::Valor(None)),
            Respuesta::Valor(v) => match parsear_fecha(&v) {
                Ok(fecha) => return Ok(Respuesta::Valor(Some(fecha))),
                Err(_) => eprintln!("fecha inválida: {v} (esperaba AAAA-MM-DD)"),
            },
        }
    }
}

pub fn preguntar_estado(etiqueta: &str) -> Result<Respuesta<Estado>> {
    loop {
        match preguntar(&format!("{etiqueta} (Pendiente/Cerrada)"), "Pendiente")? {
            Respuesta::Eof => return Ok(Respuesta::Eof),
            Respuesta::Valor(v) => match v.parse::<Estado>() {
                Ok(estado) => return Ok(Respuesta::Valor(estado)),
                Err(_) => eprintln!("estado inválido: {v} (Pendiente o Cerrada)"),
            },
        }
    }
}

/// Pregunta s/n; Eof y respuestas no reconocidas cuentan como "no".
pub fn confirmar(etiqueta: &str, por_defecto: bool) -> Result<bool> {
    let sugerido = if por_defecto { "s" } else { "n" };
    match preguntar(&format!("{etiqueta} (s/n)"), sugerido)? {
        Respuesta::Eof => Ok(false),
        Respuesta::Valor(v) => Ok(es_afirmativo(&v, por_defecto)),
    }
}

fn parsear_rango(s: &str) -> Option<u8> {
    let n = s.trim().parse::<u8>().ok()?;
    (1..=4).contains(&n).then_some(n)
}

fn es_afirmativo(s: &str, por_defecto: bool) -> bool {
    match s.trim().to_ascii_lowercase().as_str() {
        "" => por_defecto,
        "s" | "si" | "sí" | "y" | "yes" => true,
        _ => false,
    }
}
