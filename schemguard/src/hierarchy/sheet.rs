use crate::error::ErcError;
use crate::schematic::Schematic;

use super::port::{Direction, Port};

/// One hierarchical sub-design: its own component container plus the ports it
/// exposes to siblings. Self-contained; knows nothing about other sheets.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    /// Used for per-sheet file names on export. Defaults to `name`.
    pub title: String,
    pub schematic: Schematic,
    ports: Vec<Port>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, schematic: Schematic) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            schematic,
            ports: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a port owned by this sheet. Port names are unique per sheet.
    pub fn add_port(&mut self, name: impl Into<String>, direction: &str) -> Result<(), ErcError> {
        let port = Port::new(name, direction, self.name.as_str())?;
        self.push_port(port)
    }

    pub fn add_port_with_direction(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
    ) -> Result<(), ErcError> {
        self.push_port(Port::with_direction(name, direction, self.name.as_str()))
    }

    fn push_port(&mut self, port: Port) -> Result<(), ErcError> {
        if self.find_port(&port.name).is_some() {
            return Err(ErcError::DuplicatePort {
                sheet: self.name.clone(),
                port: port.name,
            });
        }
        self.ports.push(port);
        Ok(())
    }

    pub fn find_port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Ports in declaration order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ports_are_owned_and_ordered() {
        let mut sheet = Sheet::new("power", Schematic::new());
        sheet.add_port("5V_OUT", "out").unwrap();
        sheet.add_port("GND", "inout").unwrap();
        sheet.add_port_with_direction("EN", Direction::In).unwrap();

        let names: Vec<_> = sheet.ports().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["5V_OUT", "GND", "EN"]);
        assert!(sheet.ports().iter().all(|p| p.sheet == "power"));
        assert_eq!(sheet.find_port("GND").unwrap().direction, Direction::InOut);
        assert!(sheet.find_port("3.3V_OUT").is_none());
        assert_eq!(sheet.title, "power");
    }

    #[test]
    fn bad_direction_leaves_sheet_untouched() {
        let mut sheet = Sheet::new("mcu", Schematic::new());
        let err = sheet.add_port("VDD", "power").unwrap_err();
        assert!(matches!(err, ErcError::InvalidDirection { .. }));
        assert!(sheet.ports().is_empty());
    }

    #[test]
    fn redeclared_port_is_rejected() {
        let mut sheet = Sheet::new("io", Schematic::new());
        sheet.add_port("SIG", "in").unwrap();

        let err = sheet.add_port("SIG", "out").unwrap_err();
        assert_eq!(
            err,
            ErcError::DuplicatePort {
                sheet: "io".into(),
                port: "SIG".into()
            }
        );
        assert_eq!(err.to_string(), "Port 'SIG' is declared more than once on sheet 'io'");
        assert!(matches!(
            sheet.add_port_with_direction("SIG", Direction::InOut),
            Err(ErcError::DuplicatePort { .. })
        ));

        assert_eq!(sheet.ports().len(), 1);
        assert_eq!(sheet.find_port("SIG").unwrap().direction, Direction::In);
    }
}
