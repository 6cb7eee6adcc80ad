use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

use calamine::{Data, Range, Reader, Xlsx};

fn recorrida_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recorrida"));
    cmd.env("HOME", home);
    cmd.current_dir(home);
    cmd.env_remove("RECORRIDA_CONFIG");
    cmd.env_remove("RECORRIDA_EMPRESA");
    cmd.env_remove("RECORRIDA_UBICACION");
    cmd.env_remove("RECORRIDA_UTC_OFFSET");
    cmd.env_remove("RECORRIDA_PLANTILLA");
    cmd.env_remove("RECORRIDA_LOGO");
    cmd.env_remove("RECORRIDA_UI_COLOR");
    cmd.env_remove("RECORRIDA_UI_MAX_TABLE_ROWS");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    recorrida_cmd(home).args(args).output().expect("run recorrida")
}

fn make_temp_home() -> PathBuf {
    static HOME_SEQ: AtomicU64 = AtomicU64::new(0);

    let seq = HOME_SEQ.fetch_add(1, Ordering::Relaxed);
    let home = std::env::temp_dir().join(format!(
        "recorrida-exportar-test-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&home);
    std::fs::create_dir_all(&home).expect("create home");
    home
}

fn hallazgo_json(area: &str, no_conformidad: &str, gravedad: u8, probabilidad: u8) -> String {
    format!(
        r#"{{
            "fecha": "2025-09-07",
            "empresa": "Molinos SJ",
            "ubicacion": "San Juan",
            "area": "{area}",
            "no_conformidad": "{no_conformidad}",
            "descripcion": "",
            "gravedad": {gravedad},
            "probabilidad": {probabilidad},
            "riesgo": {riesgo},
            "categoria": null,
            "accion": null,
            "medida": "",
            "responsable": "",
            "plazo": null,
            "estado": "Pendiente",
            "normativa": null,
            "foto_nombre": null
        }}"#,
        riesgo = gravedad * probabilidad,
    )
}

fn leer_hoja(ruta: &Path, nombre: &str) -> Range<Data> {
    let bytes = std::fs::read(ruta).expect("leer salida");
    let mut libro = Xlsx::new(Cursor::new(bytes)).expect("abrir xlsx");
    libro.worksheet_range(nombre).expect("hoja")
}

fn celda_texto(celda: &Data) -> String {
    match celda {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        otro => otro.to_string(),
    }
}

/// Libro de partida con una hoja de presentación y una hoja DATOS con un
/// hallazgo previo, como lo dejaría una recorrida anterior.
fn escribir_libro_previo(ruta: &Path) {
    let mut libro = umya_spreadsheet::new_file_empty_worksheet();
    let portada = libro.new_sheet("PORTADA").expect("hoja");
    portada.get_cell_mut((1, 1)).set_value("Informe de prevención");
    portada.get_cell_mut((3, 2)).set_value("no tocar");

    let datos = libro.new_sheet("DATOS").expect("hoja");
    let encabezados = [
        "fecha", "empresa", "ubicacion", "area", "no_conformidad", "descripcion",
        "gravedad", "probabilidad", "riesgo", "categoria", "accion", "medida",
        "responsable", "plazo", "estado", "normativa", "foto_nombre",
    ];
    for (c, nombre) in encabezados.iter().enumerate() {
        datos.get_cell_mut((c as u32 + 1, 1)).set_value(*nombre);
    }
    for (c, valor) in [
        "2025-08-01", "Molinos SJ", "San Juan", "Empaquetado", "Cinta sin guarda",
    ]
    .iter()
    .enumerate()
    {
        datos.get_cell_mut((c as u32 + 1, 2)).set_value(*valor);
    }
    umya_spreadsheet::writer::xlsx::write(&libro, ruta).expect("escribir libro previo");
}

#[test]
fn exportar_sin_libro_crea_uno_con_datos() {
    let home = make_temp_home();
    let json = format!("[{}]", hallazgo_json("Caldera", "Tablero sin tapas", 3, 2));
    std::fs::write(home.join("hallazgos.json"), json).expect("write");

    let out = run(
        &home,
        &["exportar", "--hallazgos", "hallazgos.json", "--salida", "salida.xlsx"],
    );
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let rango = leer_hoja(&home.join("salida.xlsx"), "DATOS");
    let filas: Vec<Vec<String>> = rango
        .rows()
        .map(|f| f.iter().map(celda_texto).collect())
        .collect();
    assert_eq!(filas.len(), 2);
    assert_eq!(filas[0][0], "fecha");
    assert_eq!(filas[0][8], "riesgo");
    assert_eq!(filas[1][3], "Caldera");
    assert_eq!(filas[1][4], "Tablero sin tapas");
    assert_eq!(filas[1][8], "6");
    assert_eq!(filas[1][14], "Pendiente");
    let _ = std::fs::remove_dir_all(&home);
}

#[test]
fn exportar_anexa_al_final_y_preserva_las_demas_hojas() {
    let home = make_temp_home();
    escribir_libro_previo(&home.join("libro.xlsx"));
    let json = format!(
        "[{},{}]",
        hallazgo_json("Hornos", "Quemador sin protección", 2, 2),
        hallazgo_json("Rampa", "Piso resbaladizo", 3, 1),
    );
    std::fs::write(home.join("hallazgos.json"), json).expect("write");

    let out = run(
        &home,
        &[
            "exportar",
            "--hallazgos",
            "hallazgos.json",
            "--libro",
            "libro.xlsx",
            "--salida",
            "salida.xlsx",
        ],
    );
    assert!(
        out.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    // La fila vieja primero, las nuevas en orden de carga.
    let rango = leer_hoja(&home.join("salida.xlsx"), "DATOS");
    let areas: Vec<String> = rango.rows().skip(1).map(|f| celda_texto(&f[3])).collect();
    assert_eq!(areas, ["Empaquetado", "Hornos", "Rampa"]);

    let portada = leer_hoja(&home.join("salida.xlsx"), "PORTADA");
    assert_eq!(
        celda_texto(portada.get((0, 0)).expect("celda")),
        "Informe de prevención"
    );
    assert_eq!(celda_texto(portada.get((1, 2)).expect("celda")), "no tocar");

    // El libro original quedó intacto.
    let original = leer_hoja(&home.join("libro.xlsx"), "DATOS");
    assert_eq!(original.rows().count(), 2);
    let _ = std::fs::remove_dir_all(&home);
}
