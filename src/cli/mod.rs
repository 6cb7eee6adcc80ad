use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::core::{Hallazgo, Sesion, TablaRiesgo, formatear_fecha, parsear_fecha};
use crate::ui::UiConfig;

mod interactive;

#[derive(Debug, Parser)]
#[command(
    name = "recorrida",
    version,
    about = "Carga guiada de hallazgos de recorridas de higiene y seguridad: libro Excel incremental, resumen informativo y evidencias"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Registrar(RegistrarArgs),
    Matriz(MatrizArgs),
    Exportar(ExportarArgs),
    Resumen(ResumenArgs),
    Fotos(FotosArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct RegistrarArgs {
    /// Libro existente: habilita la clasificación por "TABLA RIESGO" y el
    /// agregado incremental a su hoja "DATOS".
    #[arg(long)]
    pub libro: Option<PathBuf>,
    #[arg(long)]
    pub salida: Option<PathBuf>,
    #[arg(long)]
    pub resumen: Option<PathBuf>,
    #[arg(long)]
    pub fotos: Option<PathBuf>,
    #[arg(long)]
    pub plantilla: Option<PathBuf>,
    #[arg(long)]
    pub logo: Option<PathBuf>,
    #[arg(long)]
    pub empresa: Option<String>,
    #[arg(long)]
    pub ubicacion: Option<String>,
    /// Fecha de la recorrida (AAAA-MM-DD); por defecto hoy.
    #[arg(long)]
    pub fecha: Option<String>,
}

#[derive(Debug, Args)]
pub struct MatrizArgs {
    #[arg(long)]
    pub libro: PathBuf,
}

#[derive(Debug, Args)]
pub struct ExportarArgs {
    /// Lista de hallazgos serializada (JSON).
    #[arg(long)]
    pub hallazgos: PathBuf,
    #[arg(long)]
    pub libro: Option<PathBuf>,
    #[arg(long)]
    pub salida: PathBuf,
}

#[derive(Debug, Args)]
pub struct ResumenArgs {
    #[arg(long)]
    pub hallazgos: PathBuf,
    #[arg(long)]
    pub plantilla: Option<PathBuf>,
    #[arg(long)]
    pub logo: Option<PathBuf>,
    #[arg(long)]
    pub salida: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FotosArgs {
    #[arg(long)]
    pub dir: PathBuf,
    #[arg(long)]
    pub salida: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::config::home_dir()?;

    let env_config_path = std::env::var_os("RECORRIDA_CONFIG").map(std::path::PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Registrar(args) => {
            if cli.json {
                return Err(crate::exit::invalid_args(
                    "registrar no se puede combinar con --json",
                ));
            }
            if !(ui_cfg.stdin_is_tty && ui_cfg.stderr_is_tty) {
                return Err(crate::exit::invalid_args(
                    "registrar necesita una terminal (stdin + stderr); para uso por lotes está `exportar`",
                ));
            }
            registrar(args, &cfg, &ui_cfg)?;
        }
        Commands::Matriz(args) => {
            let bytes = std::fs::read(&args.libro)
                .with_context(|| format!("no se pudo leer el libro: {}", args.libro.display()))
                .map_err(crate::exit::invalid_args_err)?;
            let tabla = crate::sheet::matrix::tabla_desde_libro(&bytes);
            if cli.json {
                write_json(&tabla_a_json(&tabla))?;
            } else {
                crate::ui::print_tabla_riesgo(&tabla, &ui_cfg);
            }
        }
        Commands::Exportar(args) => {
            if cli.json {
                return Err(crate::exit::invalid_args(
                    "exportar no se puede combinar con --json",
                ));
            }
            let hallazgos = leer_hallazgos(&args.hallazgos)?;
            let libro = args
                .libro
                .as_deref()
                .map(|ruta| {
                    std::fs::read(ruta)
                        .with_context(|| format!("no se pudo leer el libro: {}", ruta.display()))
                })
                .transpose()
                .map_err(crate::exit::invalid_args_err)?;
            let bytes = crate::sheet::merge::combinar_datos(libro.as_deref(), &hallazgos)
                .map_err(crate::exit::export_failed_err)?;
            std::fs::write(&args.salida, bytes)
                .with_context(|| {
                    format!("no se pudo escribir la salida: {}", args.salida.display())
                })
                .map_err(crate::exit::export_failed_err)?;
            if !ui_cfg.quiet {
                println!(
                    "libro combinado: {} ({} hallazgos)",
                    args.salida.display(),
                    hallazgos.len()
                );
            }
        }
        Commands::Resumen(args) => {
            if cli.json {
                return Err(crate::exit::invalid_args(
                    "resumen no se puede combinar con --json",
                ));
            }
            let hallazgos = leer_hallazgos(&args.hallazgos)?;
            let Some(primero) = hallazgos.first() else {
                return Err(crate::exit::invalid_args(
                    "la lista de hallazgos está vacía; no hay nada que resumir",
                ));
            };
            let plantilla = cargar_plantilla(args.plantilla.as_deref(), &cfg, &ui_cfg);
            let logo_data = cargar_logo(args.logo.as_deref(), &cfg, &ui_cfg);
            let resumen = crate::report::Resumen {
                fecha: primero.fecha_texto(),
                empresa: &primero.empresa,
                ubicacion: &primero.ubicacion,
                hallazgos: &hallazgos,
                logo_data,
            };
            let texto = crate::report::renderizar(&resumen, plantilla.as_deref())?;
            match args.salida {
                Some(ruta) => {
                    std::fs::write(&ruta, texto).with_context(|| {
                        format!("no se pudo escribir el resumen: {}", ruta.display())
                    })?;
                    if !ui_cfg.quiet {
                        println!("resumen: {}", ruta.display());
                    }
                }
                None => write_text(&texto)?,
            }
        }
        Commands::Fotos(args) => {
            let bytes = crate::photos::empaquetar_directorio(&args.dir)?;
            let salida = args.salida.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "evidencias_{}.zip",
                    formatear_fecha(hoy(cfg.informe.utc_offset_hours))
                ))
            });
            std::fs::write(&salida, bytes)
                .with_context(|| format!("no se pudo escribir el zip: {}", salida.display()))?;
            if !ui_cfg.quiet {
                println!("evidencias: {}", salida.display());
            }
        }
        Commands::Completion(args) => {
            let shell = parse_shell(&args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "recorrida", &mut out);
        }
        Commands::Config(args) => {
            if args.show {
                if cli.json {
                    write_json(&serde_json::to_value(&cfg)?)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: usá `recorrida config --show`");
            }
        }
    }

    Ok(())
}

fn registrar(
    args: RegistrarArgs,
    cfg: &crate::config::EffectiveConfig,
    ui_cfg: &UiConfig,
) -> Result<()> {
    let libro = args
        .libro
        .as_deref()
        .map(|ruta| {
            std::fs::read(ruta)
                .with_context(|| format!("no se pudo leer el libro: {}", ruta.display()))
        })
        .transpose()
        .map_err(crate::exit::invalid_args_err)?;

    let tabla = match libro.as_deref() {
        Some(bytes) => {
            let tabla = crate::sheet::matrix::tabla_desde_libro(bytes);
            if tabla.vacia() {
                crate::ui::eprintln_aviso(
                    "no se pudo leer la hoja 'TABLA RIESGO'; se usará solo GxP sin categoría",
                    ui_cfg,
                );
            } else if ui_cfg.verbose {
                crate::ui::print_tabla_riesgo(&tabla, ui_cfg);
            }
            tabla
        }
        None => TablaRiesgo::default(),
    };

    let offset =
        UtcOffset::from_hms(cfg.informe.utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    let fecha = match args.fecha.as_deref() {
        Some(texto) => parsear_fecha(texto).map_err(crate::exit::invalid_args_err)?,
        None => hoy(cfg.informe.utc_offset_hours),
    };

    eprintln!("recorrida del {}. Ctrl-D termina la carga.", formatear_fecha(fecha));

    let empresa = match args.empresa.or_else(|| cfg.informe.empresa.clone()) {
        Some(v) => v,
        None => match interactive::preguntar_obligatorio("Empresa", "")? {
            interactive::Respuesta::Valor(v) => v,
            interactive::Respuesta::Eof => {
                eprintln!("sesión cancelada.");
                return Ok(());
            }
        },
    };
    let ubicacion = match args.ubicacion.or_else(|| cfg.informe.ubicacion.clone()) {
        Some(v) => v,
        None => match interactive::preguntar_obligatorio("Ubicación", "")? {
            interactive::Respuesta::Valor(v) => v,
            interactive::Respuesta::Eof => {
                eprintln!("sesión cancelada.");
                return Ok(());
            }
        },
    };

    let mut sesion = Sesion::new();
    let mut ultima_area = String::new();
    loop {
        eprintln!();
        eprintln!("hallazgo #{}:", sesion.len() + 1);
        let Some((hallazgo, foto)) =
            preguntar_hallazgo(fecha, &empresa, &ubicacion, &tabla, &ultima_area, offset)?
        else {
            break;
        };
        ultima_area = hallazgo.area.clone();
        if let Err(err) = sesion.agregar(hallazgo) {
            eprintln!("registro inválido, no se guardó: {err}");
            continue;
        }
        if let Some((nombre, bytes)) = foto {
            sesion.adjuntar_foto(nombre, bytes);
        }
        eprintln!("hallazgo registrado ({} en total).", sesion.len());
        if !interactive::confirmar("¿Registrar otro hallazgo?", true)? {
            break;
        }
    }

    if sesion.is_empty() {
        eprintln!("no se registró ningún hallazgo; no hay nada que exportar.");
        return Ok(());
    }

    crate::ui::print_hallazgos(sesion.hallazgos(), ui_cfg);

    let etiqueta = formatear_fecha(fecha);
    let salida = args
        .salida
        .unwrap_or_else(|| PathBuf::from(format!("informe_prevencion_{etiqueta}.xlsx")));

    match crate::sheet::merge::combinar_datos(libro.as_deref(), sesion.hallazgos()) {
        Ok(bytes) => {
            std::fs::write(&salida, bytes)
                .with_context(|| format!("no se pudo escribir el libro: {}", salida.display()))
                .map_err(crate::exit::export_failed_err)?;
            if !ui_cfg.quiet {
                println!("informe: {}", salida.display());
            }
        }
        Err(err) => {
            // La sesión no se pierde: el buffer queda rescatado en JSON y se
            // puede retomar con `exportar --hallazgos`.
            let rescate = PathBuf::from(format!("hallazgos_{etiqueta}.json"));
            escribir_rescate(sesion.hallazgos(), &rescate)?;
            eprintln!(
                "los hallazgos quedaron rescatados en {}; retomá con `recorrida exportar --hallazgos {}`",
                rescate.display(),
                rescate.display()
            );
            return Err(crate::exit::export_failed_err(err));
        }
    }

    let ruta_resumen = args
        .resumen
        .unwrap_or_else(|| PathBuf::from(format!("resumen_informativo_{etiqueta}.md")));
    let plantilla = cargar_plantilla(args.plantilla.as_deref(), cfg, ui_cfg);
    let logo_data = cargar_logo(args.logo.as_deref(), cfg, ui_cfg);
    let resumen = crate::report::Resumen {
        fecha: etiqueta.clone(),
        empresa: &empresa,
        ubicacion: &ubicacion,
        hallazgos: sesion.hallazgos(),
        logo_data,
    };
    let texto = crate::report::renderizar(&resumen, plantilla.as_deref())?;
    std::fs::write(&ruta_resumen, texto).with_context(|| {
        format!("no se pudo escribir el resumen: {}", ruta_resumen.display())
    })?;
    if !ui_cfg.quiet {
        println!("resumen: {}", ruta_resumen.display());
    }

    if !sesion.fotos().is_empty() {
        let ruta_fotos = args
            .fotos
            .unwrap_or_else(|| PathBuf::from(format!("evidencias_{etiqueta}.zip")));
        let bytes = crate::photos::empaquetar(sesion.fotos())?;
        std::fs::write(&ruta_fotos, bytes).with_context(|| {
            format!("no se pudo escribir el zip: {}", ruta_fotos.display())
        })?;
        if !ui_cfg.quiet {
            println!(
                "evidencias: {} ({} fotos)",
                ruta_fotos.display(),
                sesion.fotos().len()
            );
        }
    }

    Ok(())
}

/// Una vuelta completa del cuestionario. `None` significa fin de entrada; el
/// registro a medio cargar se descarta.
fn preguntar_hallazgo(
    fecha: Date,
    empresa: &str,
    ubicacion: &str,
    tabla: &TablaRiesgo,
    ultima_area: &str,
    offset: UtcOffset,
) -> Result<Option<(Hallazgo, Option<(String, Vec<u8>)>)>> {
    use interactive::Respuesta;

    macro_rules! respuesta {
        ($pregunta:expr) => {
            match $pregunta? {
                Respuesta::Valor(v) => v,
                Respuesta::Eof => return Ok(None),
            }
        };
    }

    let area = respuesta!(interactive::preguntar_obligatorio("Área", ultima_area));
    let no_conformidad = respuesta!(interactive::preguntar_obligatorio("No conformidad", ""));
    let descripcion =
        respuesta!(interactive::preguntar_opcional("Descripción")).unwrap_or_default();
    let gravedad = respuesta!(interactive::preguntar_rango("Gravedad", 2));
    let probabilidad = respuesta!(interactive::preguntar_rango("Probabilidad", 2));

    let riesgo = Hallazgo::riesgo_de(gravedad, probabilidad);
    let (categoria, accion) = tabla.clasificar(probabilidad, gravedad);
    match (&categoria, &accion) {
        (Some(cat), Some(acc)) => eprintln!("riesgo: {riesgo} ({cat}). Acción: {acc}"),
        (Some(cat), None) => eprintln!("riesgo: {riesgo} ({cat})"),
        _ => eprintln!("riesgo: {riesgo}"),
    }

    let medida =
        respuesta!(interactive::preguntar_opcional("Medida correctiva")).unwrap_or_default();
    let responsable =
        respuesta!(interactive::preguntar_opcional("Responsable")).unwrap_or_default();
    let plazo = respuesta!(interactive::preguntar_fecha("Plazo"));
    let estado = respuesta!(interactive::preguntar_estado("Estado"));
    let normativa = respuesta!(interactive::preguntar_opcional("Normativa aplicable"));

    let mut foto = None;
    let mut foto_nombre = None;
    if let Some(ruta) = respuesta!(interactive::preguntar_opcional("Foto (ruta del archivo)")) {
        let ruta = PathBuf::from(ruta);
        match std::fs::read(&ruta) {
            Ok(bytes) => {
                let nombre = match ruta.file_name().and_then(|n| n.to_str()) {
                    Some(nombre) => nombre.to_string(),
                    None => crate::photos::nombre_captura(OffsetDateTime::now_utc().to_offset(offset)),
                };
                foto_nombre = Some(nombre.clone());
                foto = Some((nombre, bytes));
            }
            Err(err) => {
                eprintln!("no se pudo leer la foto {}: {err}; se omite", ruta.display());
            }
        }
    }

    let hallazgo = Hallazgo {
        fecha,
        empresa: empresa.to_string(),
        ubicacion: ubicacion.to_string(),
        area,
        no_conformidad,
        descripcion,
        gravedad,
        probabilidad,
        riesgo,
        categoria,
        accion,
        medida,
        responsable,
        plazo,
        estado,
        normativa,
        foto_nombre,
    };
    Ok(Some((hallazgo, foto)))
}

/// Vuelca el buffer de la sesión a un JSON que `exportar --hallazgos` acepta
/// tal cual, para que un export fallido no pierda lo cargado.
fn escribir_rescate(hallazgos: &[Hallazgo], ruta: &std::path::Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(hallazgos)?;
    std::fs::write(ruta, json)
        .with_context(|| format!("no se pudo escribir el rescate: {}", ruta.display()))?;
    Ok(())
}

fn leer_hallazgos(ruta: &std::path::Path) -> Result<Vec<Hallazgo>> {
    let contenido = std::fs::read(ruta)
        .with_context(|| format!("no se pudo leer el archivo de hallazgos: {}", ruta.display()))
        .map_err(crate::exit::invalid_args_err)?;
    let hallazgos: Vec<Hallazgo> = serde_json::from_slice(&contenido)
        .with_context(|| {
            format!("el archivo de hallazgos no es una lista JSON válida: {}", ruta.display())
        })
        .map_err(crate::exit::invalid_args_err)?;
    for (i, h) in hallazgos.iter().enumerate() {
        h.validar()
            .with_context(|| format!("hallazgo #{} inválido", i + 1))
            .map_err(crate::exit::invalid_args_err)?;
    }
    Ok(hallazgos)
}

fn cargar_plantilla(
    cli_path: Option<&std::path::Path>,
    cfg: &crate::config::EffectiveConfig,
    ui_cfg: &UiConfig,
) -> Option<String> {
    let ruta = cli_path
        .map(ToOwned::to_owned)
        .or_else(|| cfg.plantilla.path.as_deref().map(PathBuf::from))?;
    match std::fs::read_to_string(&ruta) {
        Ok(texto) => Some(texto),
        Err(err) => {
            crate::ui::eprintln_aviso(
                &format!(
                    "no se pudo leer la plantilla {}: {err}; se usa la plantilla por defecto",
                    ruta.display()
                ),
                ui_cfg,
            );
            None
        }
    }
}

fn cargar_logo(
    cli_path: Option<&std::path::Path>,
    cfg: &crate::config::EffectiveConfig,
    ui_cfg: &UiConfig,
) -> Option<String> {
    let ruta = cli_path
        .map(ToOwned::to_owned)
        .or_else(|| cfg.plantilla.logo.as_deref().map(PathBuf::from))?;
    match crate::report::logo_data_uri(&ruta) {
        Ok(data) => Some(data),
        Err(err) => {
            crate::ui::eprintln_aviso(
                &format!("{err}; se usa el logo de relleno"),
                ui_cfg,
            );
            None
        }
    }
}

fn hoy(utc_offset_hours: i8) -> Date {
    let offset = UtcOffset::from_hms(utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset).date()
}

fn tabla_a_json(tabla: &TablaRiesgo) -> serde_json::Value {
    let matriz = tabla.matriz.as_ref().map(|m| {
        m.iter()
            .map(|(&(probabilidad, gravedad), categoria)| {
                serde_json::json!({
                    "probabilidad": probabilidad,
                    "gravedad": gravedad,
                    "categoria": categoria,
                })
            })
            .collect::<Vec<_>>()
    });
    let acciones = tabla.acciones.as_ref().map(|a| {
        a.iter()
            .map(|(categoria, accion)| (categoria.clone(), serde_json::Value::from(accion.clone())))
            .collect::<serde_json::Map<_, _>>()
    });
    serde_json::json!({ "matriz": matriz, "acciones": acciones })
}

fn write_json(valor: &serde_json::Value) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(valor)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn write_text(texto: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(texto.as_bytes()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        otro => Err(crate::exit::invalid_args(format!(
            "shell no soportada: {otro} (bash|zsh|fish)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use time::macros::date;

    fn hallazgo(area: &str) -> Hallazgo {
        Hallazgo {
            fecha: date!(2025 - 09 - 07),
            empresa: "Molinos SJ".to_string(),
            ubicacion: "San Juan".to_string(),
            area: area.to_string(),
            no_conformidad: "Extintor vencido".to_string(),
            descripcion: String::new(),
            gravedad: 3,
            probabilidad: 2,
            riesgo: 6,
            categoria: None,
            accion: None,
            medida: String::new(),
            responsable: String::new(),
            plazo: None,
            estado: crate::core::Estado::Pendiente,
            normativa: None,
            foto_nombre: None,
        }
    }

    fn make_temp_dir() -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let dir = std::env::temp_dir().join(format!(
            "recorrida-rescate-test-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create dir");
        dir
    }

    #[test]
    fn el_rescate_de_un_export_fallido_se_retoma_con_exportar() {
        let dir = make_temp_dir();
        let hallazgos = vec![hallazgo("Hornos"), hallazgo("Rampa")];

        // Un libro ilegible aborta la fusión sin producir salida.
        let err = crate::sheet::merge::combinar_datos(Some(b"no es un xlsx"), &hallazgos)
            .expect_err("debe fallar");
        assert!(err.to_string().contains("legible"), "{err}");

        // El buffer rescatado entra tal cual por el camino de `exportar`:
        // misma lectura, misma validación, y la fusión sin libro lo regenera.
        let ruta = dir.join("hallazgos_2025-09-07.json");
        escribir_rescate(&hallazgos, &ruta).expect("rescatar");
        let recuperados = leer_hallazgos(&ruta).expect("releer");
        assert_eq!(recuperados, hallazgos);
        let bytes = crate::sheet::merge::combinar_datos(None, &recuperados).expect("combinar");
        assert!(!bytes.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn shells_soportadas() {
        assert!(parse_shell("bash").is_ok());
        assert!(parse_shell(" Zsh ").is_ok());
        assert!(parse_shell("fish").is_ok());
        assert!(parse_shell("powershell").is_err());
    }

    #[test]
    fn tabla_vacia_a_json() {
        let json = tabla_a_json(&TablaRiesgo::default());
        assert_eq!(json["matriz"], serde_json::Value::Null);
        assert_eq!(json["acciones"], serde_json::Value::Null);
    }

    #[test]
    fn tabla_con_datos_a_json() {
        let mut matriz = crate::core::MatrizRiesgo::new();
        matriz.insert((2, 3), "Moderado".to_string());
        let mut acciones = crate::core::TablaAcciones::new();
        acciones.insert("Moderado".to_string(), "Revisar en 30 días".to_string());
        let tabla = TablaRiesgo {
            matriz: Some(matriz),
            acciones: Some(acciones),
        };
        let json = tabla_a_json(&tabla);
        assert_eq!(json["matriz"][0]["probabilidad"], 2);
        assert_eq!(json["matriz"][0]["gravedad"], 3);
        assert_eq!(json["matriz"][0]["categoria"], "Moderado");
        assert_eq!(json["acciones"]["Moderado"], "Revisar en 30 días");
    }

    #[test]
    fn la_cli_se_construye() {
        Cli::command().debug_assert();
    }
}
