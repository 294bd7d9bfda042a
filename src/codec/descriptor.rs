//! Field and method descriptor helpers.

/// Return-type portion of a method descriptor, `None` when the descriptor is not a
/// method shape.
#[must_use]
pub fn return_type(descriptor: &str) -> Option<&str> {
    descriptor.rfind(')').map(|index| &descriptor[index + 1..])
}

/// Number of JVM local slots the parameters of a method descriptor occupy
/// (`long`/`double` take two).
#[must_use]
pub fn argument_slots(descriptor: &str) -> u32 {
    let Some(open) = descriptor.find('(') else {
        return 0;
    };
    let Some(close) = descriptor.rfind(')') else {
        return 0;
    };
    let mut slots = 0;
    let params = &descriptor.as_bytes()[open + 1..close];
    let mut index = 0;
    while index < params.len() {
        match params[index] {
            b'J' | b'D' => {
                slots += 2;
                index += 1;
            }
            b'L' => {
                slots += 1;
                index = match params[index..].iter().position(|&b| b == b';') {
                    Some(semi) => index + semi + 1,
                    None => params.len(),
                };
            }
            b'[' => {
                // The array itself is one slot; skip dimensions, then the element type.
                slots += 1;
                while index < params.len() && params[index] == b'[' {
                    index += 1;
                }
                if index < params.len() {
                    if params[index] == b'L' {
                        index = match params[index..].iter().position(|&b| b == b';') {
                            Some(semi) => index + semi + 1,
                            None => params.len(),
                        };
                    } else {
                        index += 1;
                    }
                }
            }
            _ => {
                slots += 1;
                index += 1;
            }
        }
    }
    slots
}

/// All class internal names mentioned by a field or method descriptor.
///
/// Used by phantom synthesis: a synthesized member's descriptor may itself reference
/// types that are missing from the workspace.
#[must_use]
pub fn referenced_class_names(descriptor: &str) -> Vec<String> {
    let mut names = Vec::new();
    let bytes = descriptor.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'L' {
            if let Some(semi) = descriptor[index..].find(';') {
                names.push(descriptor[index + 1..index + semi].to_string());
                index += semi + 1;
                continue;
            }
            break;
        }
        index += 1;
    }
    names
}
