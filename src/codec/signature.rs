//! Generic signature validation.
//!
//! Obfuscators plant malformed `Signature` attributes that crash downstream decompilers
//! while the JVM itself ignores them. These validators implement the generic signature
//! grammar so the sanitation pass can decide which `Signature` attributes to cut.

/// Validate a class-level generic signature.
#[must_use]
pub fn is_valid_class_signature(signature: &str) -> bool {
    let mut parser = Parser::new(signature);
    parser.type_params_opt()
        && parser.class_type()
        && {
            while !parser.at_end() {
                if !parser.class_type() {
                    return false;
                }
            }
            true
        }
}

/// Validate a method-level generic signature.
#[must_use]
pub fn is_valid_method_signature(signature: &str) -> bool {
    let mut parser = Parser::new(signature);
    if !parser.type_params_opt() || !parser.eat(b'(') {
        return false;
    }
    while !parser.check(b')') {
        if !parser.type_signature() {
            return false;
        }
    }
    parser.advance(); // ')'
    if parser.check(b'V') {
        parser.advance();
    } else if !parser.type_signature() {
        return false;
    }
    while parser.eat(b'^') {
        let ok = match parser.peek() {
            Some(b'L') => parser.class_type(),
            Some(b'T') => parser.type_variable(),
            _ => false,
        };
        if !ok {
            return false;
        }
    }
    parser.at_end()
}

/// Validate a field-level generic signature.
#[must_use]
pub fn is_valid_field_signature(signature: &str) -> bool {
    let mut parser = Parser::new(signature);
    parser.field_type() && parser.at_end()
}

/// Recursive-descent cursor over a signature string.
struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(signature: &'a str) -> Self {
        Self {
            bytes: signature.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn check(&self, expected: u8) -> bool {
        self.peek() == Some(expected)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    /// One or more identifier characters (anything outside the reserved set).
    fn identifier(&mut self) -> bool {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if matches!(byte, b'.' | b';' | b'[' | b'/' | b'<' | b'>' | b':') {
                break;
            }
            self.advance();
        }
        self.pos > start
    }

    /// `<` TypeParam+ `>` when present.
    fn type_params_opt(&mut self) -> bool {
        if !self.eat(b'<') {
            return true;
        }
        let mut any = false;
        while !self.check(b'>') {
            if !self.identifier() || !self.eat(b':') {
                return false;
            }
            // Class bound is optional, interface bounds repeat.
            if !matches!(self.peek(), Some(b':') | Some(b'>')) && !self.field_type() {
                return false;
            }
            while self.eat(b':') {
                if !self.field_type() {
                    return false;
                }
            }
            any = true;
        }
        self.advance(); // '>'
        any
    }

    /// Reference type: class, type variable, or array.
    fn field_type(&mut self) -> bool {
        match self.peek() {
            Some(b'L') => self.class_type(),
            Some(b'T') => self.type_variable(),
            Some(b'[') => {
                self.advance();
                self.type_signature()
            }
            _ => false,
        }
    }

    /// Reference type or primitive.
    fn type_signature(&mut self) -> bool {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.advance();
                true
            }
            _ => self.field_type(),
        }
    }

    /// `L` name (`<` args `>`)? (`.` inner (`<` args `>`)?)* `;`
    fn class_type(&mut self) -> bool {
        if !self.eat(b'L') {
            return false;
        }
        loop {
            if !self.identifier() {
                return false;
            }
            if self.eat(b'/') {
                continue;
            }
            if self.check(b'<') && !self.type_arguments() {
                return false;
            }
            if self.eat(b'.') {
                continue;
            }
            return self.eat(b';');
        }
    }

    /// `<` TypeArgument+ `>`
    fn type_arguments(&mut self) -> bool {
        self.advance(); // '<'
        let mut any = false;
        while !self.check(b'>') {
            if self.eat(b'*') {
                any = true;
                continue;
            }
            if self.check(b'+') || self.check(b'-') {
                self.advance();
            }
            if !self.field_type() {
                return false;
            }
            any = true;
        }
        self.advance(); // '>'
        any
    }

    /// `T` Identifier `;`
    fn type_variable(&mut self) -> bool {
        self.eat(b'T') && self.identifier() && self.eat(b';')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_class_signatures() {
        assert!(is_valid_class_signature("Ljava/lang/Object;"));
        assert!(is_valid_class_signature(
            "<T:Ljava/lang/Object;>Ljava/lang/Object;Ljava/lang/Iterable<TT;>;"
        ));
        assert!(is_valid_class_signature(
            "Ljava/util/AbstractMap<Ljava/lang/String;[I>;"
        ));
    }

    #[test]
    fn test_invalid_class_signatures() {
        assert!(!is_valid_class_signature(""));
        assert!(!is_valid_class_signature("java/lang/Object"));
        assert!(!is_valid_class_signature("Ljava/lang/Object"));
        assert!(!is_valid_class_signature("<>Ljava/lang/Object;"));
        assert!(!is_valid_class_signature("L;"));
    }

    #[test]
    fn test_method_signatures() {
        assert!(is_valid_method_signature("()V"));
        assert!(is_valid_method_signature(
            "<T:Ljava/lang/Object;>(TT;I)TT;^Ljava/io/IOException;"
        ));
        assert!(is_valid_method_signature("(Ljava/util/List<*>;)V"));
        assert!(!is_valid_method_signature("()"));
        assert!(!is_valid_method_signature("(V)V"));
        assert!(!is_valid_method_signature("()V^I"));
    }

    #[test]
    fn test_field_signatures() {
        assert!(is_valid_field_signature("TT;"));
        assert!(is_valid_field_signature("Ljava/util/Map<TK;TV;>;"));
        assert!(is_valid_field_signature("[[Ljava/lang/String;"));
        assert!(!is_valid_field_signature("I()"));
        assert!(!is_valid_field_signature("Ljava/util/Map<>;"));
    }

    #[test]
    fn test_inner_class_signature() {
        assert!(is_valid_field_signature(
            "Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;"
        ));
    }
}
