mod finding;
mod risk;
mod session;

pub use finding::{COLUMNAS, Estado, Hallazgo, formatear_fecha, parsear_fecha};
pub use risk::{MatrizRiesgo, TablaAcciones, TablaRiesgo};
pub use session::Sesion;
