use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Map, Value, json};

use crate::core::Hallazgo;

/// Plantilla editable del "Resumen informativo". El usuario puede traer la
/// suya; si no parsea o no renderiza, se vuelve a esta con los mismos datos.
pub const PLANTILLA_POR_DEFECTO: &str = r#"{% if logo_data %}![]({{ logo_data }})

{% endif %}**Fecha:** {{ fecha }}
**Empresa:** {{ empresa }}
**Ubicación:** {{ ubicacion }}

**Resumen de hallazgos ({{ total }}):**
{% for area, items in por_area|items %}
- **Área {{ area }}** ({{ items|length }}):
{% for it in items %}  - {{ it.no_conformidad }} — Riesgo: {{ it.riesgo }} (G={{ it.gravedad }}, P={{ it.probabilidad }}){% if it.categoria %} — **{{ it.categoria }}**{% endif %}{% if it.medida %}. Medida: {{ it.medida }}{% endif %}{% if it.plazo %} (Plazo: {{ it.plazo }}){% endif %}{% if it.normativa %} [Normativa: {{ it.normativa }}]{% endif %}
{% if it.accion %}    _Acción según tabla:_ {{ it.accion }}
{% endif %}{% endfor %}{% endfor %}
**Por qué actuar ahora:**
- Reducir probabilidad/consecuencia de incidentes (eléctricos, incendios, resbalones, presión, etc.).
- Evitar paradas no planificadas y costos asociados.
- Cumplir con Ley 19.587 y Decreto 351/79; registrar EPP conforme Res. SRT 299/2011.

**Próximos pasos:**
- Asignar responsables y normalizar plazos vencidos.
- Proveer/registrar EPP donde aplique.
- Programar mantenimiento correctivo/preventivo según hallazgos.
"#;

/// Logo de relleno (PNG transparente de 1x1) cuando no se aporta uno.
pub const LOGO_POR_DEFECTO: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

/// Datos que recibe la plantilla; el armado del texto es del motor.
#[derive(Debug)]
pub struct Resumen<'a> {
    pub fecha: String,
    pub empresa: &'a str,
    pub ubicacion: &'a str,
    pub hallazgos: &'a [Hallazgo],
    pub logo_data: Option<String>,
}

impl Resumen<'_> {
    /// Contexto con las variables documentadas: fecha, empresa, ubicacion,
    /// total, por_area y logo_data.
    fn contexto(&self) -> Value {
        json!({
            "fecha": self.fecha,
            "empresa": self.empresa,
            "ubicacion": self.ubicacion,
            "total": self.hallazgos.len(),
            "por_area": agrupar_por_area(self.hallazgos),
            "logo_data": self.logo_data.clone().unwrap_or_else(|| LOGO_POR_DEFECTO.to_string()),
        })
    }
}

/// Agrupa por área con igualdad exacta, preservando el orden de primera
/// aparición y, dentro de cada área, el orden de carga.
pub fn agrupar_por_area(hallazgos: &[Hallazgo]) -> Value {
    let mut por_area = Map::new();
    for h in hallazgos {
        let item = json!({
            "fecha": h.fecha_texto(),
            "no_conformidad": h.no_conformidad,
            "riesgo": h.riesgo,
            "gravedad": h.gravedad,
            "probabilidad": h.probabilidad,
            "categoria": h.categoria,
            "accion": h.accion,
            "medida": h.medida,
            "plazo": h.plazo_texto(),
            "normativa": h.normativa,
        });
        if let Value::Array(items) = por_area
            .entry(h.area.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            items.push(item);
        }
    }
    Value::Object(por_area)
}

/// Renderiza el resumen. Una plantilla de usuario rota no es error: se cae a
/// la plantilla por defecto con el mismo contexto.
pub fn renderizar(resumen: &Resumen<'_>, plantilla_usuario: Option<&str>) -> Result<String> {
    let contexto = resumen.contexto();
    if let Some(plantilla) = plantilla_usuario {
        if let Ok(texto) = renderizar_plantilla(plantilla, &contexto) {
            return Ok(texto);
        }
    }
    renderizar_plantilla(PLANTILLA_POR_DEFECTO, &contexto)
        .context("la plantilla por defecto no renderizó")
}

fn renderizar_plantilla(fuente: &str, contexto: &Value) -> Result<String, minijinja::Error> {
    let mut entorno = minijinja::Environment::new();
    entorno.add_template("resumen", fuente)?;
    entorno.get_template("resumen")?.render(contexto)
}

/// Lee una imagen y la embebe como data URI (PNG o JPEG según extensión).
pub fn logo_data_uri(ruta: &Path) -> Result<String> {
    let bytes = std::fs::read(ruta)
        .with_context(|| format!("no se pudo leer el logo: {}", ruta.display()))?;
    let mime = match ruta
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    };
    Ok(format!("data:{mime};base64,{}", BASE64.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Estado;
    use time::macros::date;

    fn hallazgo(area: &str, no_conformidad: &str) -> Hallazgo {
        Hallazgo {
            fecha: date!(2025 - 09 - 07),
            empresa: "Molinos SJ".to_string(),
            ubicacion: "San Juan".to_string(),
            area: area.to_string(),
            no_conformidad: no_conformidad.to_string(),
            descripcion: String::new(),
            gravedad: 3,
            probabilidad: 2,
            riesgo: 6,
            categoria: Some("Moderado".to_string()),
            accion: Some("Revisar en 30 días".to_string()),
            medida: "Reponer tapas".to_string(),
            responsable: String::new(),
            plazo: None,
            estado: Estado::Pendiente,
            normativa: None,
            foto_nombre: None,
        }
    }

    fn resumen(hallazgos: &[Hallazgo]) -> Resumen<'_> {
        Resumen {
            fecha: "2025-09-07".to_string(),
            empresa: "Molinos SJ",
            ubicacion: "San Juan",
            hallazgos,
            logo_data: None,
        }
    }

    #[test]
    fn agrupa_en_orden_de_primera_aparicion() {
        let hallazgos = vec![
            hallazgo("Hornos", "h1"),
            hallazgo("Rampa", "r1"),
            hallazgo("Hornos", "h2"),
        ];
        let Value::Object(por_area) = agrupar_por_area(&hallazgos) else {
            panic!("se esperaba objeto");
        };
        let areas: Vec<&String> = por_area.keys().collect();
        assert_eq!(areas, ["Hornos", "Rampa"]);
        let hornos = por_area["Hornos"].as_array().expect("lista");
        assert_eq!(hornos.len(), 2);
        assert_eq!(hornos[0]["no_conformidad"], "h1");
        assert_eq!(hornos[1]["no_conformidad"], "h2");
    }

    #[test]
    fn plantilla_por_defecto_renderiza() {
        let hallazgos = vec![hallazgo("Caldera", "Tablero sin tapas")];
        let texto = renderizar(&resumen(&hallazgos), None).expect("render");
        assert!(texto.contains("**Empresa:** Molinos SJ"), "{texto}");
        assert!(texto.contains("Resumen de hallazgos (1)"), "{texto}");
        assert!(texto.contains("Área Caldera"), "{texto}");
        assert!(texto.contains("Riesgo: 6 (G=3, P=2)"), "{texto}");
        assert!(texto.contains("**Moderado**"), "{texto}");
        assert!(texto.contains("Revisar en 30 días"), "{texto}");
        assert!(texto.contains(LOGO_POR_DEFECTO), "{texto}");
    }

    #[test]
    fn plantilla_de_usuario_valida_se_usa() {
        let hallazgos = vec![hallazgo("Caldera", "x")];
        let texto = renderizar(
            &resumen(&hallazgos),
            Some("total={{ total }} en {{ ubicacion }}"),
        )
        .expect("render");
        assert_eq!(texto, "total=1 en San Juan");
    }

    #[test]
    fn plantilla_rota_cae_a_la_por_defecto() {
        let hallazgos = vec![hallazgo("Caldera", "x")];
        let texto = renderizar(&resumen(&hallazgos), Some("{% for %}"))
            .expect("render");
        assert!(texto.contains("Resumen de hallazgos (1)"), "{texto}");
    }

    #[test]
    fn error_de_render_tambien_cae() {
        // Parsea bien pero falla al renderizar (variable indefinida llamada).
        let hallazgos = vec![hallazgo("Caldera", "x")];
        let texto = renderizar(&resumen(&hallazgos), Some("{{ no_existe.metodo() }}"))
            .expect("render");
        assert!(texto.contains("Resumen de hallazgos (1)"), "{texto}");
    }

    #[test]
    fn logo_propio_reemplaza_al_de_relleno() {
        let hallazgos = vec![hallazgo("Caldera", "x")];
        let mut r = resumen(&hallazgos);
        r.logo_data = Some("data:image/png;base64,AAAA".to_string());
        let texto = renderizar(&r, None).expect("render");
        assert!(texto.contains("![](data:image/png;base64,AAAA)"), "{texto}");
        assert!(!texto.contains(LOGO_POR_DEFECTO));
    }
}
