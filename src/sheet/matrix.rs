use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx};

use crate::core::{MatrizRiesgo, TablaAcciones, TablaRiesgo};

/// Nombre literal de la hoja que trae la matriz oficial del libro.
pub const HOJA_TABLA_RIESGO: &str = "TABLA RIESGO";

/// Lee la hoja "TABLA RIESGO" de un libro en memoria. Cualquier problema
/// (bytes ilegibles, hoja ausente, región de claves malformada) degrada a una
/// tabla vacía: el registro sigue funcionando sin categoría ni acción.
pub fn tabla_desde_libro(bytes: &[u8]) -> TablaRiesgo {
    let Ok(mut libro) = Xlsx::new(Cursor::new(bytes)) else {
        return TablaRiesgo::default();
    };
    if !libro.sheet_names().iter().any(|n| n == HOJA_TABLA_RIESGO) {
        return TablaRiesgo::default();
    }
    match libro.worksheet_range(HOJA_TABLA_RIESGO) {
        Ok(rango) => parsear_tabla_riesgo(&rango),
        Err(_) => TablaRiesgo::default(),
    }
}

/// Recupera la matriz PxG y la tabla de acciones buscando encabezados por
/// contenido, no por coordenadas fijas: la celda que contiene "gravedad"
/// ancla la fila de claves de gravedad, la que contiene "probabilidad" ancla
/// la columna de claves de probabilidad, y el bloque 4x4 de categorías tiene
/// su esquina en (fila de probabilidad, columna de gravedad).
pub fn parsear_tabla_riesgo(rango: &Range<Data>) -> TablaRiesgo {
    let Some((gi, gj)) = buscar(rango, "gravedad") else {
        return TablaRiesgo::default();
    };
    let Some((pi, pj)) = buscar(rango, "probabilidad") else {
        return TablaRiesgo::default();
    };

    // Justo debajo de "gravedad" van cuatro claves consecutivas, y a la
    // derecha de "probabilidad" otras cuatro. Se respetan en el orden de la
    // hoja, sin reordenar. Si alguna no parsea como entero, se aborta toda la
    // extracción: sin claves no hay forma de indexar el bloque.
    let mut claves_g = [0u8; 4];
    let mut claves_p = [0u8; 4];
    for k in 0..4 {
        match (clave(rango, gi + 1, gj + k), clave(rango, pi + k, pj + 1)) {
            (Some(g), Some(p)) => {
                claves_g[k] = g;
                claves_p[k] = p;
            }
            _ => return TablaRiesgo::default(),
        }
    }

    let mut matriz = MatrizRiesgo::new();
    for (r, p) in claves_p.iter().enumerate() {
        for (c, g) in claves_g.iter().enumerate() {
            // Celdas vacías o no textuales quedan sin entrada.
            if let Some(celda) = texto_no_vacio(rango, pi + r, gj + c) {
                matriz.insert((*p, *g), celda.to_string());
            }
        }
    }

    TablaRiesgo {
        matriz: (!matriz.is_empty()).then_some(matriz),
        acciones: parsear_acciones(rango),
    }
}

/// Bloque "Evaluacion del riesgo" / "Accion y cronograma": la columna del
/// encabezado trae las categorías y la columna contigua las acciones. Se
/// recorre hasta el final de la hoja; solo las filas con categoría no vacía
/// generan entrada (las corridas de filas en blanco no cortan el barrido).
fn parsear_acciones(rango: &Range<Data>) -> Option<TablaAcciones> {
    let (fila, col) = buscar(rango, "evaluacion del riesgo")?;
    if col + 1 >= rango.width() {
        return None;
    }

    let mut tabla = TablaAcciones::new();
    for k in (fila + 1)..rango.height() {
        if let Some(categoria) = texto_no_vacio(rango, k, col) {
            let accion = texto(rango, k, col + 1).unwrap_or_default();
            tabla.insert(categoria.to_string(), accion.to_string());
        }
    }
    (!tabla.is_empty()).then_some(tabla)
}

/// Primera celda (orden fila-mayor) cuyo texto contiene la subcadena, sin
/// distinguir mayúsculas.
fn buscar(rango: &Range<Data>, subcadena: &str) -> Option<(usize, usize)> {
    for (i, fila) in rango.rows().enumerate() {
        for (j, celda) in fila.iter().enumerate() {
            if let Data::String(s) = celda {
                if s.to_lowercase().contains(subcadena) {
                    return Some((i, j));
                }
            }
        }
    }
    None
}

fn texto<'a>(rango: &'a Range<Data>, fila: usize, col: usize) -> Option<&'a str> {
    match rango.get((fila, col)) {
        Some(Data::String(s)) => Some(s.trim()),
        _ => None,
    }
}

fn texto_no_vacio<'a>(rango: &'a Range<Data>, fila: usize, col: usize) -> Option<&'a str> {
    texto(rango, fila, col).filter(|s| !s.is_empty())
}

/// Clave de fila/columna: entero pequeño, venga como número o como texto.
fn clave(rango: &Range<Data>, fila: usize, col: usize) -> Option<u8> {
    let valor = match rango.get((fila, col))? {
        Data::Int(i) => *i,
        Data::Float(f) => *f as i64,
        Data::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u8::try_from(valor).ok()
}
