use std::collections::BTreeMap;

/// Mapa (probabilidad, gravedad) -> categoría de riesgo, tal como figura en la
/// hoja "TABLA RIESGO". Puede ser parcial: las celdas vacías de la hoja no
/// generan entrada.
pub type MatrizRiesgo = BTreeMap<(u8, u8), String>;

/// Mapa categoría -> "Acción y cronograma". Las claves son exactamente los
/// textos de categoría encontrados en la hoja.
pub type TablaAcciones = BTreeMap<String, String>;

/// Resultado de leer la hoja "TABLA RIESGO". Cada mitad es independiente:
/// puede detectarse la matriz sin la tabla de acciones y viceversa.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablaRiesgo {
    pub matriz: Option<MatrizRiesgo>,
    pub acciones: Option<TablaAcciones>,
}

impl TablaRiesgo {
    /// Clasifica un hallazgo por (probabilidad, gravedad). Función total:
    /// la ausencia de matriz, de celda o de acción produce `None`, nunca error.
    pub fn clasificar(&self, probabilidad: u8, gravedad: u8) -> (Option<String>, Option<String>) {
        let categoria = self
            .matriz
            .as_ref()
            .and_then(|m| m.get(&(probabilidad, gravedad)).cloned());
        let accion = match (&categoria, &self.acciones) {
            (Some(cat), Some(tabla)) => tabla.get(cat).cloned(),
            _ => None,
        };
        (categoria, accion)
    }

    pub fn vacia(&self) -> bool {
        self.matriz.is_none() && self.acciones.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabla_ejemplo() -> TablaRiesgo {
        let mut matriz = MatrizRiesgo::new();
        matriz.insert((2, 3), "Moderado".to_string());
        matriz.insert((4, 4), "Intolerable".to_string());
        let mut acciones = TablaAcciones::new();
        acciones.insert("Moderado".to_string(), "Revisar en 30 días".to_string());
        TablaRiesgo {
            matriz: Some(matriz),
            acciones: Some(acciones),
        }
    }

    #[test]
    fn clasificar_con_matriz_y_accion() {
        let tabla = tabla_ejemplo();
        let (categoria, accion) = tabla.clasificar(2, 3);
        assert_eq!(categoria.as_deref(), Some("Moderado"));
        assert_eq!(accion.as_deref(), Some("Revisar en 30 días"));
    }

    #[test]
    fn clasificar_celda_ausente() {
        let tabla = tabla_ejemplo();
        assert_eq!(tabla.clasificar(1, 1), (None, None));
    }

    #[test]
    fn clasificar_categoria_sin_accion() {
        let tabla = tabla_ejemplo();
        let (categoria, accion) = tabla.clasificar(4, 4);
        assert_eq!(categoria.as_deref(), Some("Intolerable"));
        assert_eq!(accion, None);
    }

    #[test]
    fn clasificar_sin_matriz() {
        let tabla = TablaRiesgo::default();
        assert_eq!(tabla.clasificar(2, 3), (None, None));
        assert!(tabla.vacia());
    }
}
