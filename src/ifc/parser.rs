//! ISO 10303-21 ("STEP physical file") parser.
//!
//! IFC models are exchanged as STEP files: a HEADER section describing the
//! file followed by a DATA section of numbered entity instances such as
//! `#12=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',#5,'Wall-001',$,...);`.
//!
//! This module parses that syntax into an entity map and knows nothing about
//! IFC semantics beyond it. Complex (multi-leaf) instances are skipped, which
//! is tolerable for the entity types the processor consumes.

use std::collections::HashMap;

/// Errors produced while parsing a STEP file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file does not start with the `ISO-10303-21;` magic.
    #[error("not a STEP file: missing ISO-10303-21 header")]
    NotStep,

    #[error("unexpected end of file at line {0}")]
    UnexpectedEof(usize),

    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("duplicate entity id #{0}")]
    DuplicateId(u64),

    /// The header section carries no `FILE_SCHEMA` record.
    #[error("missing FILE_SCHEMA in header section")]
    MissingSchema,
}

/// A single attribute value of an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    /// `$` — attribute not provided.
    Null,
    /// `*` — value derived from the schema.
    Derived,
    Integer(i64),
    Real(f64),
    Str(String),
    /// Enumeration literal without the surrounding dots, e.g. `ELEMENT`.
    Enum(String),
    /// Reference to another instance, `#12`.
    Ref(u64),
    List(Vec<Attr>),
    /// Wrapped select value, e.g. `IFCLENGTHMEASURE(2.4)`.
    Typed(String, Box<Attr>),
}

impl Attr {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ref_id(&self) -> Option<u64> {
        match self {
            Self::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Numeric value, unwrapping typed measures like `IFCLENGTHMEASURE(2.4)`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Typed(_, inner) => inner.as_f64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Attr]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A parsed entity instance from the DATA section.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: u64,
    /// Uppercase STEP type name, e.g. `IFCWALL`.
    pub ty: String,
    pub attrs: Vec<Attr>,
}

impl Entity {
    pub fn attr(&self, index: usize) -> Option<&Attr> {
        self.attrs.get(index)
    }

    pub fn string(&self, index: usize) -> Option<&str> {
        self.attr(index).and_then(Attr::as_str)
    }

    pub fn reference(&self, index: usize) -> Option<u64> {
        self.attr(index).and_then(Attr::as_ref_id)
    }

    pub fn real(&self, index: usize) -> Option<f64> {
        self.attr(index).and_then(Attr::as_f64)
    }

    pub fn list(&self, index: usize) -> Option<&[Attr]> {
        self.attr(index).and_then(Attr::as_list)
    }
}

/// HEADER section contents relevant to processing.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// Schema identifier from `FILE_SCHEMA`, e.g. `IFC4` or `IFC2X3`.
    pub schema: String,
    /// Original file name from `FILE_NAME`, if present.
    pub file_name: Option<String>,
    /// First description string from `FILE_DESCRIPTION`, if present.
    pub description: Option<String>,
}

/// A fully parsed STEP file: header plus entity and type indexes.
#[derive(Debug)]
pub struct StepData {
    pub header: Header,
    pub entities: HashMap<u64, Entity>,
    /// Instance ids grouped by uppercase type name, in file order.
    pub by_type: HashMap<String, Vec<u64>>,
}

/// Parse a STEP physical file from source text.
pub fn parse(source: &str) -> Result<StepData, ParseError> {
    Parser::new(source).parse()
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn parse(mut self) -> Result<StepData, ParseError> {
        self.skip_ws()?;
        if !self.eat_literal("ISO-10303-21") {
            return Err(ParseError::NotStep);
        }
        self.expect_byte(b';')?;

        let mut header = Header::default();
        let mut entities: HashMap<u64, Entity> = HashMap::new();
        let mut by_type: HashMap<String, Vec<u64>> = HashMap::new();

        loop {
            self.skip_ws()?;
            if self.eat_literal("END-ISO-10303-21") {
                self.expect_byte(b';')?;
                break;
            }
            let section = self.parse_ident()?;
            self.expect_byte(b';')?;
            match section.as_str() {
                "HEADER" => self.parse_header_section(&mut header)?,
                "DATA" => self.parse_data_section(&mut entities, &mut by_type)?,
                other => {
                    return Err(self.syntax(format!("unknown section '{other}'")));
                }
            }
        }

        if header.schema.is_empty() {
            return Err(ParseError::MissingSchema);
        }

        Ok(StepData {
            header,
            entities,
            by_type,
        })
    }

    fn parse_header_section(&mut self, header: &mut Header) -> Result<(), ParseError> {
        loop {
            self.skip_ws()?;
            let name = self.parse_ident()?;
            if name == "ENDSEC" {
                self.expect_byte(b';')?;
                return Ok(());
            }
            self.skip_ws()?;
            let params = self.parse_paren_list()?;
            self.expect_byte(b';')?;

            match name.as_str() {
                "FILE_SCHEMA" => {
                    // FILE_SCHEMA(('IFC4'));
                    if let Some(schemas) = params.first().and_then(Attr::as_list) {
                        if let Some(schema) = schemas.first().and_then(Attr::as_str) {
                            header.schema = schema.to_string();
                        }
                    }
                }
                "FILE_NAME" => {
                    if let Some(file_name) = params.first().and_then(Attr::as_str) {
                        header.file_name = Some(file_name.to_string());
                    }
                }
                "FILE_DESCRIPTION" => {
                    if let Some(descriptions) = params.first().and_then(Attr::as_list) {
                        if let Some(description) = descriptions.first().and_then(Attr::as_str) {
                            if !description.is_empty() {
                                header.description = Some(description.to_string());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn parse_data_section(
        &mut self,
        entities: &mut HashMap<u64, Entity>,
        by_type: &mut HashMap<String, Vec<u64>>,
    ) -> Result<(), ParseError> {
        loop {
            self.skip_ws()?;
            if self.peek()? == b'#' {
                self.bump();
                let id = self.parse_u64()?;
                self.skip_ws()?;
                self.expect_byte(b'=')?;
                self.skip_ws()?;

                if self.peek()? == b'(' {
                    // Complex instance: consume and skip.
                    self.skip_balanced()?;
                    self.skip_ws()?;
                    self.expect_byte(b';')?;
                    continue;
                }

                let ty = self.parse_ident()?;
                self.skip_ws()?;
                let attrs = self.parse_paren_list()?;
                self.expect_byte(b';')?;

                if entities.contains_key(&id) {
                    return Err(ParseError::DuplicateId(id));
                }
                by_type.entry(ty.clone()).or_default().push(id);
                entities.insert(id, Entity { id, ty, attrs });
            } else {
                let name = self.parse_ident()?;
                if name == "ENDSEC" {
                    self.expect_byte(b';')?;
                    return Ok(());
                }
                return Err(self.syntax(format!("unexpected '{name}' in DATA section")));
            }
        }
    }

    /// Parse `( value, value, ... )` into a list of attributes.
    fn parse_paren_list(&mut self) -> Result<Vec<Attr>, ParseError> {
        self.expect_byte(b'(')?;
        let mut items = Vec::new();
        self.skip_ws()?;
        if self.peek()? == b')' {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(self.parse_value()?);
            self.skip_ws()?;
            match self.peek()? {
                b',' => {
                    self.bump();
                }
                b')' => {
                    self.bump();
                    return Ok(items);
                }
                other => {
                    return Err(self.syntax(format!(
                        "expected ',' or ')' in parameter list, found '{}'",
                        other as char
                    )));
                }
            }
        }
    }

    fn parse_value(&mut self) -> Result<Attr, ParseError> {
        self.skip_ws()?;
        match self.peek()? {
            b'$' => {
                self.bump();
                Ok(Attr::Null)
            }
            b'*' => {
                self.bump();
                Ok(Attr::Derived)
            }
            b'#' => {
                self.bump();
                Ok(Attr::Ref(self.parse_u64()?))
            }
            b'\'' => Ok(Attr::Str(self.parse_string()?)),
            b'"' => Ok(Attr::Str(self.parse_binary()?)),
            b'.' => self.parse_enum(),
            b'(' => Ok(Attr::List(self.parse_paren_list()?)),
            b'+' | b'-' | b'0'..=b'9' => self.parse_number(),
            c if c.is_ascii_alphabetic() || c == b'_' => {
                // Wrapped select value: TYPENAME(value)
                let name = self.parse_ident()?;
                self.skip_ws()?;
                let mut values = self.parse_paren_list()?;
                let inner = if values.len() == 1 {
                    values.remove(0)
                } else {
                    Attr::List(values)
                };
                Ok(Attr::Typed(name, Box::new(inner)))
            }
            other => Err(self.syntax(format!("unexpected character '{}'", other as char))),
        }
    }

    /// Parse a quoted string, handling the `''` quote escape and backslash
    /// directives (`\\`, `\S\`, `\X\`, `\X2\`, `\X4\`).
    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect_byte(b'\'')?;
        let mut raw = Vec::new();
        loop {
            match self.next_byte()? {
                b'\'' => {
                    if self.peek_opt() == Some(b'\'') {
                        self.bump();
                        raw.push(b'\'');
                    } else {
                        break;
                    }
                }
                b'\n' => {
                    self.line += 1;
                    raw.push(b'\n');
                }
                other => raw.push(other),
            }
        }
        Ok(decode_escapes(&String::from_utf8_lossy(&raw)))
    }

    /// Binary literal `"0FF00..."`, kept as its raw hex text.
    fn parse_binary(&mut self) -> Result<String, ParseError> {
        self.expect_byte(b'"')?;
        let mut raw = Vec::new();
        loop {
            match self.next_byte()? {
                b'"' => break,
                other => raw.push(other),
            }
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn parse_enum(&mut self) -> Result<Attr, ParseError> {
        self.expect_byte(b'.')?;
        let mut name = String::new();
        loop {
            match self.next_byte()? {
                b'.' => break,
                c if c.is_ascii_alphanumeric() || c == b'_' => name.push(c as char),
                other => {
                    return Err(
                        self.syntax(format!("invalid enumeration character '{}'", other as char))
                    );
                }
            }
        }
        Ok(Attr::Enum(name))
    }

    fn parse_number(&mut self) -> Result<Attr, ParseError> {
        let start = self.pos;
        if matches!(self.peek()?, b'+' | b'-') {
            self.bump();
        }
        let mut is_real = false;
        while let Some(c) = self.peek_opt() {
            match c {
                b'0'..=b'9' => self.bump(),
                b'.' => {
                    is_real = true;
                    self.bump();
                }
                b'E' | b'e' => {
                    is_real = true;
                    self.bump();
                    if matches!(self.peek_opt(), Some(b'+') | Some(b'-')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.syntax("invalid number".to_string()))?;
        if is_real {
            text.parse::<f64>()
                .map(Attr::Real)
                .map_err(|_| self.syntax(format!("invalid real literal '{text}'")))
        } else {
            match text.parse::<i64>() {
                Ok(value) => Ok(Attr::Integer(value)),
                // Very large ids in attribute position degrade to reals.
                Err(_) => text
                    .parse::<f64>()
                    .map(Attr::Real)
                    .map_err(|_| self.syntax(format!("invalid integer literal '{text}'"))),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek()? {
            c if c.is_ascii_alphabetic() || c == b'_' => self.bump(),
            other => {
                return Err(self.syntax(format!(
                    "expected identifier, found '{}'",
                    other as char
                )));
            }
        }
        while let Some(c) = self.peek_opt() {
            if c.is_ascii_alphanumeric() || c == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.syntax("invalid identifier".to_string()))?;
        Ok(text.to_ascii_uppercase())
    }

    fn parse_u64(&mut self) -> Result<u64, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek_opt() {
            if c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.syntax("expected instance number".to_string()));
        }
        let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or_default();
        text.parse::<u64>()
            .map_err(|_| self.syntax(format!("invalid instance number '{text}'")))
    }

    /// Skip a balanced parenthesized group, ignoring parens inside strings.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        self.expect_byte(b'(')?;
        let mut depth = 1usize;
        loop {
            match self.next_byte()? {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                b'\'' => loop {
                    match self.next_byte()? {
                        b'\'' => {
                            if self.peek_opt() == Some(b'\'') {
                                self.bump();
                            } else {
                                break;
                            }
                        }
                        b'\n' => self.line += 1,
                        _ => {}
                    }
                },
                b'\n' => self.line += 1,
                _ => {}
            }
        }
    }

    fn skip_ws(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek_opt() {
                Some(b'\n') => {
                    self.line += 1;
                    self.bump();
                }
                Some(c) if c.is_ascii_whitespace() => self.bump(),
                Some(b'/') if self.bytes.get(self.pos + 1) == Some(&b'*') => {
                    self.pos += 2;
                    loop {
                        match self.next_byte()? {
                            b'*' if self.peek_opt() == Some(b'/') => {
                                self.bump();
                                break;
                            }
                            b'\n' => self.line += 1,
                            _ => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consume `literal` if the input starts with it here.
    fn eat_literal(&mut self, literal: &str) -> bool {
        if self.bytes[self.pos..].starts_with(literal.as_bytes()) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<(), ParseError> {
        self.skip_ws()?;
        let found = self.next_byte()?;
        if found == expected {
            Ok(())
        } else {
            Err(self.syntax(format!(
                "expected '{}', found '{}'",
                expected as char, found as char
            )))
        }
    }

    fn peek(&self) -> Result<u8, ParseError> {
        self.peek_opt().ok_or(ParseError::UnexpectedEof(self.line))
    }

    fn peek_opt(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn next_byte(&mut self) -> Result<u8, ParseError> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn syntax(&self, message: String) -> ParseError {
        ParseError::Syntax {
            line: self.line,
            message,
        }
    }
}

/// Decode STEP string escape directives into UTF-8.
fn decode_escapes(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let rest = &chars[i + 1..];
        match rest.first() {
            Some('\\') => {
                out.push('\\');
                i += 2;
            }
            // \S\c — shifted latin-1 upper half character.
            Some('S') if rest.get(1) == Some(&'\\') && rest.len() >= 3 => {
                if let Some(decoded) = char::from_u32(rest[2] as u32 + 0x80) {
                    out.push(decoded);
                }
                i += 4;
            }
            // \X\hh\ — single latin-1 byte as two hex digits.
            Some('X') if rest.get(1) == Some(&'\\') => {
                let hex: String = rest.iter().skip(2).take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if rest.get(4) == Some(&'\\') => {
                        out.push(decoded);
                        i += 6;
                    }
                    _ => {
                        out.push('\\');
                        i += 1;
                    }
                }
            }
            // \X2\hhhh...\X0\ — UTF-16BE code units; \X4\ — 8-digit codepoints.
            Some('X') if matches!(rest.get(1), Some('2') | Some('4')) && rest.get(2) == Some(&'\\') => {
                let width = if rest[1] == '2' { 4 } else { 8 };
                let mut j = 3;
                let mut units: Vec<u32> = Vec::new();
                let mut valid = true;
                loop {
                    if rest[j..].starts_with(&['\\', 'X', '0', '\\']) {
                        j += 4;
                        break;
                    }
                    if j + width > rest.len() {
                        valid = false;
                        break;
                    }
                    let hex: String = rest[j..j + width].iter().collect();
                    match u32::from_str_radix(&hex, 16) {
                        Ok(unit) => units.push(unit),
                        Err(_) => {
                            valid = false;
                            break;
                        }
                    }
                    j += width;
                }
                if valid {
                    if width == 4 {
                        let code_units: Vec<u16> = units.iter().map(|u| *u as u16).collect();
                        out.push_str(&String::from_utf16_lossy(&code_units));
                    } else {
                        for unit in units {
                            if let Some(decoded) = char::from_u32(unit) {
                                out.push(decoded);
                            }
                        }
                    }
                    i += 1 + j;
                } else {
                    out.push('\\');
                    i += 1;
                }
            }
            // \PA\ and friends — codepage directives, no textual content.
            Some('P') if rest.get(2) == Some(&'\\') => {
                i += 4;
            }
            _ => {
                out.push('\\');
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(data: &str) -> String {
        format!(
            "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION(('test model'),'2;1');\n\
             FILE_NAME('demo.ifc','2024-05-01T10:00:00',('author'),('org'),'pp','orig','');\n\
             FILE_SCHEMA(('IFC4'));\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n"
        )
    }

    #[test]
    fn parses_header_schema_and_metadata() {
        let step = parse(&wrap("")).unwrap();
        assert_eq!(step.header.schema, "IFC4");
        assert_eq!(step.header.file_name.as_deref(), Some("demo.ifc"));
        assert_eq!(step.header.description.as_deref(), Some("test model"));
    }

    #[test]
    fn rejects_non_step_input() {
        assert!(matches!(parse("hello world"), Err(ParseError::NotStep)));
    }

    #[test]
    fn parses_entity_with_mixed_attributes() {
        let step = parse(&wrap(
            "#1=IFCWALL('2O2Fr$t4X7Zf8NOew3FLOH',$,'Wall-001',*,(#2,#3),.ELEMENT.,1.5,42,IFCLENGTHMEASURE(2.4));",
        ))
        .unwrap();
        let wall = &step.entities[&1];
        assert_eq!(wall.ty, "IFCWALL");
        assert_eq!(wall.string(0), Some("2O2Fr$t4X7Zf8NOew3FLOH"));
        assert!(wall.attrs[1].is_null());
        assert_eq!(wall.string(2), Some("Wall-001"));
        assert_eq!(wall.attrs[3], Attr::Derived);
        assert_eq!(
            wall.list(4).unwrap(),
            &[Attr::Ref(2), Attr::Ref(3)]
        );
        assert_eq!(wall.attrs[5], Attr::Enum("ELEMENT".to_string()));
        assert_eq!(wall.real(6), Some(1.5));
        assert_eq!(wall.attrs[7], Attr::Integer(42));
        assert_eq!(wall.real(8), Some(2.4));
    }

    #[test]
    fn parses_real_literal_variants() {
        let step = parse(&wrap("#1=IFCCARTESIANPOINT((0.,1.E-5,-3.25));")).unwrap();
        let coords = step.entities[&1].list(0).unwrap();
        assert_eq!(coords[0].as_f64(), Some(0.0));
        assert_eq!(coords[1].as_f64(), Some(1.0e-5));
        assert_eq!(coords[2].as_f64(), Some(-3.25));
    }

    #[test]
    fn decodes_string_escapes() {
        let step = parse(&wrap(
            "#1=IFCPROJECT('g',$,'O''Brien \\X2\\00E9\\X0\\ caf\\X\\E9\\',$,$,$,$,$,$);",
        ))
        .unwrap();
        assert_eq!(step.entities[&1].string(2), Some("O'Brien \u{e9} caf\u{e9}"));
    }

    #[test]
    fn skips_comments_between_tokens() {
        let step = parse(&wrap(
            "/* a wall follows */\n#1=IFCWALL('g',$,/* name */'W',$,$,$,$,$,$);",
        ))
        .unwrap();
        assert_eq!(step.entities[&1].string(2), Some("W"));
    }

    #[test]
    fn indexes_instances_by_type() {
        let step = parse(&wrap(
            "#1=IFCWALL('a',$,$,$,$,$,$,$,$);\n#2=IFCWALL('b',$,$,$,$,$,$,$,$);\n#3=IFCDOOR('c',$,$,$,$,$,$,$,$,$,$,$,$);",
        ))
        .unwrap();
        assert_eq!(step.by_type["IFCWALL"], vec![1, 2]);
        assert_eq!(step.by_type["IFCDOOR"], vec![3]);
    }

    #[test]
    fn rejects_duplicate_instance_ids() {
        let result = parse(&wrap(
            "#1=IFCWALL('a',$,$,$,$,$,$,$,$);\n#1=IFCWALL('b',$,$,$,$,$,$,$,$);",
        ));
        assert!(matches!(result, Err(ParseError::DuplicateId(1))));
    }

    #[test]
    fn rejects_missing_schema() {
        let result = parse(
            "ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''),'2;1');\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;",
        );
        assert!(matches!(result, Err(ParseError::MissingSchema)));
    }

    #[test]
    fn skips_complex_instances() {
        let step = parse(&wrap(
            "#1=(IFCREPRESENTATIONCONTEXT($,$)IFCGEOMETRICREPRESENTATIONCONTEXT($,$,3,1.E-5,#2,$));\n#2=IFCWALL('a',$,$,$,$,$,$,$,$);",
        ))
        .unwrap();
        assert!(!step.entities.contains_key(&1));
        assert!(step.entities.contains_key(&2));
    }

    #[test]
    fn syntax_error_reports_line_number() {
        let result = parse(&wrap("#1=IFCWALL('a',$,%);"));
        match result {
            Err(ParseError::Syntax { line, .. }) => assert_eq!(line, 8),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }
}
