//! Part 21 parser: builds a raw entity graph from tokens.
//!
//! Entities are kept untyped: an ID, a type name and a list of argument
//! values. Complex instances (`#n=(A(..)B(..));`) are stored under the
//! type name [`COMPLEX_ENTITY`] with one [`StepValue::Typed`] per part.

use std::collections::BTreeMap;

use crate::error::StepError;
use crate::lexer::{Lexer, SpannedToken, Token};

/// Type name given to complex (multi-part) entity instances.
pub const COMPLEX_ENTITY: &str = "(COMPLEX)";

/// A single argument value in a STEP entity.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// Entity reference (e.g., `#123`).
    EntityRef(u64),
    /// String literal.
    String(String),
    /// Real number.
    Real(f64),
    /// Integer number.
    Integer(i64),
    /// Enumeration (e.g., `.T.`).
    Enum(String),
    /// List of values (nested in parentheses).
    List(Vec<StepValue>),
    /// Derived/computed value (`*`).
    Derived,
    /// Null/unset value (`$`).
    Null,
    /// Typed value: `TYPE_NAME(args)`, inline or as a complex-instance part.
    Typed {
        /// The type name.
        type_name: String,
        /// Arguments.
        args: Vec<StepValue>,
    },
}

impl StepValue {
    /// Try to get as an entity reference.
    pub fn as_entity_ref(&self) -> Option<u64> {
        match self {
            StepValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as a real number (also accepts integer).
    pub fn as_real(&self) -> Option<f64> {
        match self {
            StepValue::Real(v) => Some(*v),
            StepValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            StepValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an enum.
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            StepValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a list.
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            StepValue::List(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, StepValue::Null)
    }
}

/// A parsed STEP entity.
#[derive(Debug, Clone)]
pub struct StepEntity {
    /// Entity ID (from `#123`); zero for header entities.
    pub id: u64,
    /// Entity type name (e.g., `CARTESIAN_POINT`).
    pub type_name: String,
    /// Arguments to the entity constructor.
    pub args: Vec<StepValue>,
}

/// The complete parsed content of a STEP file.
#[derive(Debug, Clone)]
pub struct StepFile {
    /// Header section entities, in file order.
    pub header: Vec<StepEntity>,
    /// Data section entities, ordered by ID.
    pub entities: BTreeMap<u64, StepEntity>,
}

impl StepFile {
    /// Get an entity by ID.
    pub fn get(&self, id: u64) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Get an entity by ID, returning an error if not found.
    pub fn require(&self, id: u64) -> Result<&StepEntity, StepError> {
        self.entities.get(&id).ok_or(StepError::MissingEntity(id))
    }

    /// All entities of a given type, in ID order.
    pub fn entities_of_type(&self, type_name: &str) -> Vec<&StepEntity> {
        self.entities
            .values()
            .filter(|e| e.type_name == type_name)
            .collect()
    }
}

/// Parser for Part 21 STEP files.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parse a STEP file from bytes.
    pub fn parse(input: &[u8]) -> Result<StepFile, StepError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Parser { tokens, pos: 0 };
        parser.parse_file()
    }

    fn parse_file(&mut self) -> Result<StepFile, StepError> {
        let mut header = Vec::new();
        let mut entities = BTreeMap::new();

        self.expect_keyword("ISO-10303-21")?;
        self.expect_token(&Token::Semicolon)?;

        loop {
            if self.check_keyword("HEADER") {
                self.advance();
                self.expect_token(&Token::Semicolon)?;
                header = self.parse_header_section()?;
                self.expect_section_end()?;
            } else if self.check_keyword("DATA") {
                self.advance();
                // DATA may carry a parameter list in later editions of Part 21.
                if self.check_token(&Token::LParen) {
                    self.parse_args()?;
                }
                self.expect_token(&Token::Semicolon)?;
                for entity in self.parse_data_section()? {
                    if let Some(prev) = entities.insert(entity.id, entity) {
                        return Err(StepError::parser(
                            Some(prev.id),
                            "duplicate entity instance name",
                        ));
                    }
                }
                self.expect_section_end()?;
            } else if self.check_keyword("END-ISO-10303-21") {
                self.advance();
                self.expect_token(&Token::Semicolon)?;
                break;
            } else {
                return Err(self.unexpected("HEADER, DATA or END-ISO-10303-21"));
            }
        }

        Ok(StepFile { header, entities })
    }

    fn expect_section_end(&mut self) -> Result<(), StepError> {
        self.expect_keyword("ENDSEC")?;
        self.expect_token(&Token::Semicolon)
    }

    fn parse_header_section(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            if type_name == "ENDSEC" {
                break;
            }
            self.advance();
            let args = self.parse_args()?;
            self.expect_token(&Token::Semicolon)?;
            entities.push(StepEntity {
                id: 0,
                type_name,
                args,
            });
        }
        Ok(entities)
    }

    fn parse_data_section(&mut self) -> Result<Vec<StepEntity>, StepError> {
        let mut entities = Vec::new();
        while let Some(Token::EntityRef(id)) = self.peek_token().cloned() {
            self.advance();
            self.expect_token(&Token::Equals)?;

            let (type_name, args) = match self.peek_token().cloned() {
                Some(Token::Keyword(name)) => {
                    self.advance();
                    (name, self.parse_args()?)
                }
                Some(Token::LParen) => (COMPLEX_ENTITY.to_string(), self.parse_complex_parts()?),
                other => {
                    return Err(StepError::parser(
                        Some(id),
                        format!("expected type name, got {other:?}"),
                    ));
                }
            };
            self.expect_token(&Token::Semicolon)?;

            entities.push(StepEntity {
                id,
                type_name,
                args,
            });
        }
        Ok(entities)
    }

    /// `( A(..) B(..) ... )`: parts follow each other without separators.
    fn parse_complex_parts(&mut self) -> Result<Vec<StepValue>, StepError> {
        self.expect_token(&Token::LParen)?;
        let mut parts = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek_token().cloned() {
            self.advance();
            let args = self.parse_args()?;
            parts.push(StepValue::Typed { type_name, args });
        }
        self.expect_token(&Token::RParen)?;
        if parts.is_empty() {
            return Err(StepError::parser(None, "empty complex entity"));
        }
        Ok(parts)
    }

    fn parse_args(&mut self) -> Result<Vec<StepValue>, StepError> {
        self.expect_token(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check_token(&Token::RParen) {
            args.push(self.parse_value()?);
            while self.check_token(&Token::Comma) {
                self.advance();
                args.push(self.parse_value()?);
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(args)
    }

    fn parse_value(&mut self) -> Result<StepValue, StepError> {
        let value = match self.peek_token().cloned() {
            Some(Token::EntityRef(id)) => StepValue::EntityRef(id),
            Some(Token::String(s)) => StepValue::String(s),
            Some(Token::Real(v)) => StepValue::Real(v),
            Some(Token::Integer(v)) => StepValue::Integer(v),
            Some(Token::Enum(s)) => StepValue::Enum(s),
            Some(Token::Asterisk) => StepValue::Derived,
            Some(Token::Dollar) => StepValue::Null,
            Some(Token::LParen) => return self.parse_args().map(StepValue::List),
            Some(Token::Keyword(type_name)) => {
                self.advance();
                let args = self.parse_args()?;
                return Ok(StepValue::Typed { type_name, args });
            }
            _ => return Err(self.unexpected("a value")),
        };
        self.advance();
        Ok(value)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check_token(&self, expected: &Token) -> bool {
        self.peek_token() == Some(expected)
    }

    fn check_keyword(&self, name: &str) -> bool {
        matches!(self.peek_token(), Some(Token::Keyword(k)) if k == name)
    }

    fn unexpected(&self, expected: &str) -> StepError {
        match self.tokens.get(self.pos) {
            Some(t) => StepError::parser(
                None,
                format!(
                    "expected {expected}, got {:?} at line {}, column {}",
                    t.token, t.pos.line, t.pos.col
                ),
            ),
            None => StepError::parser(None, format!("expected {expected}, got end of file")),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), StepError> {
        if self.check_token(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{expected:?}")))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), StepError> {
        if self.check_keyword(name) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("keyword '{name}'")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let input = r#"
ISO-10303-21;
HEADER;
FILE_DESCRIPTION((''), '2;1');
FILE_SCHEMA(('AUTOMOTIVE_DESIGN { 1 0 10303 214 1 1 1 1 }'));
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('origin', (0.0, 0.0, 0.0));
#2 = DIRECTION('x', (1.0, 0.0, 0.0));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        assert_eq!(file.header.len(), 2);
        assert_eq!(file.header[1].type_name, "FILE_SCHEMA");
        assert_eq!(file.entities.len(), 2);

        let p1 = file.get(1).unwrap();
        assert_eq!(p1.type_name, "CARTESIAN_POINT");
        assert_eq!(p1.args[0].as_string(), Some("origin"));
        let coords = p1.args[1].as_list().unwrap();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0].as_real(), Some(0.0));
    }

    #[test]
    fn test_parse_null_derived_and_typed() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = SOME_ENTITY($, *, 'value', 3);
#2 = UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-07), #3, 'distance_accuracy_value', '');
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(1).unwrap();
        assert!(e.args[0].is_null());
        assert!(matches!(e.args[1], StepValue::Derived));
        assert_eq!(e.args[2].as_string(), Some("value"));
        assert!(matches!(e.args[3], StepValue::Integer(3)));

        let u = file.get(2).unwrap();
        match &u.args[0] {
            StepValue::Typed { type_name, args } => {
                assert_eq!(type_name, "LENGTH_MEASURE");
                assert_eq!(args[0].as_real(), Some(1e-7));
            }
            other => panic!("expected typed value, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_complex_instance() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#7=(LENGTH_UNIT()NAMED_UNIT(*)SI_UNIT(.MILLI.,.METRE.));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let e = file.get(7).unwrap();
        assert_eq!(e.type_name, COMPLEX_ENTITY);
        assert_eq!(e.args.len(), 3);
        match &e.args[2] {
            StepValue::Typed { type_name, args } => {
                assert_eq!(type_name, "SI_UNIT");
                assert_eq!(args[0].as_enum(), Some("MILLI"));
            }
            other => panic!("expected typed part, got {other:?}"),
        }
    }

    #[test]
    fn test_entities_of_type_in_id_order() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#30 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
#2 = DIRECTION('', (1.0, 0.0, 0.0));
#10 = CARTESIAN_POINT('', (1.0, 0.0, 0.0));
ENDSEC;
END-ISO-10303-21;
"#;
        let file = Parser::parse(input.as_bytes()).unwrap();
        let ids: Vec<u64> = file
            .entities_of_type("CARTESIAN_POINT")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![10, 30]);
    }

    #[test]
    fn test_duplicate_instance_rejected() {
        let input = "ISO-10303-21;HEADER;ENDSEC;DATA;#1=A();#1=B();ENDSEC;END-ISO-10303-21;";
        assert!(matches!(
            Parser::parse(input.as_bytes()),
            Err(StepError::Parser { entity_id: Some(1), .. })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let input = "ISO-10303-21;HEADER;ENDSEC;DATA;#1=A(";
        let err = Parser::parse(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("end of file"));
    }
}
