use std::io::{self, Write};

use anyhow::Error;
use unicode_width::UnicodeWidthChar;

use crate::core::{Hallazgo, TablaRiesgo};

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causas = err.chain().skip(1).peekable();
    if causas.peek().is_some() {
        let _ = writeln!(stderr, "causas:");
        for causa in causas {
            let _ = writeln!(stderr, "  - {causa}");
        }
    }

    let _ = writeln!(stderr, "siguiente paso:");
    let _ = writeln!(
        stderr,
        "  - reintentá con `--verbose` para ver más detalle"
    );
    let _ = writeln!(
        stderr,
        "  - los comandos y opciones están en `recorrida --help`"
    );
}

pub fn eprintln_aviso(mensaje: &str, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "aviso: {mensaje}");
}

/// Tabla de los hallazgos cargados en la sesión, acotada a max_table_rows.
pub fn print_hallazgos(hallazgos: &[Hallazgo], cfg: &UiConfig) {
    if cfg.quiet || hallazgos.is_empty() {
        return;
    }

    let encabezados = ["#", "área", "no conformidad", "G", "P", "riesgo", "categoría", "estado"];
    let filas: Vec<[String; 8]> = hallazgos
        .iter()
        .enumerate()
        .map(|(i, h)| {
            [
                (i + 1).to_string(),
                recortar(&h.area, 18),
                recortar(&h.no_conformidad, 36),
                h.gravedad.to_string(),
                h.probabilidad.to_string(),
                h.riesgo.to_string(),
                recortar(h.categoria.as_deref().unwrap_or(""), 14),
                h.estado.to_string(),
            ]
        })
        .collect();

    let mut anchos = [0usize; 8];
    for (i, titulo) in encabezados.iter().enumerate() {
        anchos[i] = ancho(titulo);
    }
    for fila in &filas {
        for (i, celda) in fila.iter().enumerate() {
            anchos[i] = anchos[i].max(ancho(celda));
        }
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(out, "hallazgos cargados ({}):", hallazgos.len());
    let encabezado = formatear_fila(&encabezados.map(str::to_string), &anchos);
    if cfg.color {
        let _ = writeln!(out, "\x1b[1m{encabezado}\x1b[0m");
    } else {
        let _ = writeln!(out, "{encabezado}");
    }
    let visibles = filas.len().min(cfg.max_table_rows.max(1));
    for fila in filas.iter().take(visibles) {
        let _ = writeln!(out, "{}", formatear_fila(fila, &anchos));
    }
    if filas.len() > visibles {
        let _ = writeln!(out, "...(quedan {} filas)", filas.len() - visibles);
    }
}

/// Vista 4x4 de la matriz detectada (filas P=1..4, columnas G=1..4) más la
/// tabla de acciones, como la muestra el libro.
pub fn print_tabla_riesgo(tabla: &TablaRiesgo, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();

    match &tabla.matriz {
        Some(matriz) => {
            let _ = writeln!(out, "matriz P x G -> categoría:");
            let encabezados: Vec<String> = std::iter::once("P\\G".to_string())
                .chain((1..=4).map(|g| format!("G={g}")))
                .collect();
            let filas: Vec<Vec<String>> = (1..=4u8)
                .map(|p| {
                    std::iter::once(format!("P={p}"))
                        .chain((1..=4u8).map(|g| {
                            matriz.get(&(p, g)).cloned().unwrap_or_default()
                        }))
                        .collect()
                })
                .collect();
            let mut anchos = vec![0usize; 5];
            for (i, titulo) in encabezados.iter().enumerate() {
                anchos[i] = ancho(titulo);
            }
            for fila in &filas {
                for (i, celda) in fila.iter().enumerate() {
                    anchos[i] = anchos[i].max(ancho(celda));
                }
            }
            let _ = writeln!(out, "{}", formatear_fila(&encabezados, &anchos));
            for fila in &filas {
                let _ = writeln!(out, "{}", formatear_fila(fila, &anchos));
            }
        }
        None => {
            let _ = writeln!(
                out,
                "no se pudo leer la matriz; se usará solo GxP sin categoría"
            );
        }
    }

    let _ = writeln!(out);
    match &tabla.acciones {
        Some(acciones) => {
            let _ = writeln!(out, "acción y cronograma por categoría:");
            for (categoria, accion) in acciones {
                let _ = writeln!(out, "- {categoria}: {accion}");
            }
        }
        None => {
            let _ = writeln!(out, "no se encontró la tabla 'Evaluacion del riesgo'");
        }
    }
}

fn formatear_fila<S: AsRef<str>>(celdas: &[S], anchos: &[usize]) -> String {
    let mut linea = String::new();
    for (i, celda) in celdas.iter().enumerate() {
        if i > 0 {
            linea.push_str("  ");
        }
        let celda = celda.as_ref();
        linea.push_str(celda);
        let relleno = anchos.get(i).copied().unwrap_or(0).saturating_sub(ancho(celda));
        for _ in 0..relleno {
            linea.push(' ');
        }
    }
    linea.trim_end().to_string()
}

fn ancho(s: &str) -> usize {
    s.chars().map(|c| c.width().unwrap_or(0)).sum()
}

fn recortar(s: &str, max: usize) -> String {
    if ancho(s) <= max {
        return s.to_string();
    }
    let mut salida = String::new();
    let mut acumulado = 0usize;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if acumulado + w > max.saturating_sub(1) {
            break;
        }
        salida.push(c);
        acumulado += w;
    }
    salida.push('…');
    salida
}
