use serde_json::{Value, json};

/// Built-in configuration merged beneath every user configuration.
///
/// Catalog patterns are prefix-matched against column names and declared
/// types; generator expressions are regexes rendered into strings.
pub fn default_config() -> Value {
    json!({
        "schema": null,
        "data_types": {
            "base_types": {
                "datetime": {
                    "value": {"start": "2020-01-01T10:00:00", "end": "2023-01-01T10:00:00"},
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "float": {
                    "value": {"start": 0.0, "end": 10.0},
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "int": {
                    "value": {"start": 0, "end": 10},
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "boolean": {
                    "value": {"start": 0, "end": 10},
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                }
            },
            "collections": {
                "name": {
                    "pattern": "((.*)?name(.*)?)|((.*)?nombre(.*)?)",
                    "values": [
                        "Liam", "Olivia", "Noah", "Emma", "Oliver", "Charlotte", "Elijah",
                        "Amelia", "James", "Ava", "William", "Sophia", "Benjamin", "Isabella",
                        "Lucas", "Mia", "Henry", "Evelyn", "Theodore", "Harper"
                    ],
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "surname": {
                    "pattern": "((.*)?apellido(.*)?)|((.*)?surname(.*)?)",
                    "values": [
                        "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller",
                        "Davis", "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez",
                        "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin"
                    ],
                    "samples": 10,
                    "priority": 1,
                    "distribution": {"type": "normal", "config": null}
                },
                "addres": {
                    "pattern": "((.*)?addres(.*)?)|((.*)?direction(.*)?)|((.*)?location(.*)?)|((.*)?ubication(.*)?)|((.*)?dirección(.*)?)|((.*)?direccion(.*)?)|((.*)?localización(.*)?)|((.*)?ubicación(.*)?)|((.*)?localizacion(.*)?)|((.*)?ubicacion(.*)?)",
                    "values": ["Address 1", "Address 2", "Address 3"],
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "sex": {
                    "pattern": "((.*)?sex(.*)?)|((.*)?gender(.*)?)|((.*)?género(.*)?)",
                    "values": ["male", "female", "other"],
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                },
                "text": {
                    "pattern": "((.*)?text(.*)?)",
                    "values": [
                        "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Pellentesque maximus justo et est bibendum porttitor. Donec ultricies odio a sem aliquet consectetur. In facilisis mollis nisi.",
                        "Suspendisse vel maximus dui. Morbi ultricies dolor nec arcu maximus, in finibus nibh imperdiet. Cras libero diam, rutrum sit amet ante ac, facilisis finibus diam.",
                        "Etiam maximus vitae sapien sed elementum. Praesent felis metus, molestie nec posuere ultricies, maximus quis arcu. Pellentesque in lectus at urna aliquam maximus non in mi.",
                        "Nam malesuada sit amet dui pretium fringilla quis vulputate ligula. Etiam porttitor massa sem, eu feugiat augue scelerisque in.",
                        "Sed ligula velit, dictum id nibh vitae, cursus hendrerit massa. Proin lobortis erat orci, eu molestie urna mollis at. Pellentesque at sagittis velit, vel pellentesque lectus."
                    ],
                    "samples": 10,
                    "distribution": {"type": "normal", "config": null}
                }
            },
            "generables": {
                "id": {
                    "pattern": "((.*)?id(.*)?)",
                    "samples": 10,
                    "generator": "[0-9]{1,10}"
                },
                "uuid": {
                    "pattern": "((.*)?uuid(.*)?)|((.*)?uid(.*)?)",
                    "samples": 10,
                    "priority": 1,
                    "generator": "[a-f0-9]{8}-[a-f0-9]{4}-4[a-f0-9]{3}-[89ab][a-f0-9]{3}-[a-f0-9]{12}"
                },
                "phone": {
                    "pattern": "((.*)?phone(.*)?)|((.*)?movil(.*)?)|((.*)?móvil(.*)?)|((.*)?telefono(.*)?)|((.*)?teléfono(.*)?)",
                    "samples": 10,
                    "generator": "\\+?\\(?[0-9]{3}\\)?[- .]?[0-9]{3}[- .]?[0-9]{4,6}"
                },
                "email": {
                    "pattern": "((.*)?email(.*)?)|((.*)?mail(.*)?)|((.*)?correo(.*)?)",
                    "samples": 10,
                    "generator": "[a-z0-9._%+-]{1,16}@[a-z0-9-]{1,12}\\.[a-z]{2,4}"
                },
                "ip": {
                    "pattern": "(.*)?ip(.*)?",
                    "samples": 10,
                    "generator": "(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)"
                },
                "dni": {
                    "pattern": "(.*)?dni(.*)?",
                    "samples": 10,
                    "generator": "[0-9]{7}[A-Z]"
                },
                "varchar": {
                    "pattern": "varchar",
                    "samples": 10,
                    "generator": "[a-zA-Z]{1,255}"
                },
                "char": {
                    "pattern": "char",
                    "samples": 10,
                    "generator": "[a-zA-Z]"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataTypes;

    #[test]
    fn default_catalogs_deserialize() {
        let config = default_config();
        let data_types: DataTypes =
            serde_json::from_value(config["data_types"].clone()).expect("typed catalogs");
        assert_eq!(data_types.base_types.len(), 4);
        assert_eq!(data_types.collections.len(), 5);
        assert_eq!(data_types.generables.len(), 8);
        assert!(config["schema"].is_null());
    }
}
