//! Tokenizer for RFC 4512 schema descriptions.
//!
//! A description is a parenthesized list of barewords, single-quoted strings
//! and nested lists, e.g. `( 2.5.4.3 NAME ( 'cn' 'commonName' ) SUP name )`.
use crate::error::Error;

/// Length of the description excerpt included in lexing errors.
const SNIPPET_LENGTH: usize = 50;

/// One element of a schema description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// A bareword or a quoted string, with escapes resolved.
	Word(String),
	/// A parenthesized list.
	List(Vec<Token>),
}

impl Token {
	/// The string, if this token is a word.
	#[must_use]
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Word(word) => Some(word),
			Token::List(_) => None,
		}
	}
}

impl From<&str> for Token {
	fn from(word: &str) -> Self {
		Token::Word(word.to_owned())
	}
}

/// Split a schema description into the elements of its enclosing list.
///
/// Long lines wrapped per RFC 4512 (a newline followed by a space) are joined
/// first. Inside nested lists the `$` separator is dropped.
pub fn tokenize(description: &str) -> Result<Vec<Token>, Error> {
	let text = description.replace("\n ", "");
	let mut lexer = Lexer { description, text: text.as_bytes(), position: 0 };

	lexer.skip_whitespace();
	if lexer.peek() != Some(b'(') {
		return Err(lexer.error("schema description must be enclosed in parentheses"));
	}
	lexer.position += 1;
	let tokens = lexer.list(false)?;

	lexer.skip_whitespace();
	if lexer.peek().is_some() {
		return Err(lexer.error("unexpected characters after closing parenthesis"));
	}
	Ok(tokens)
}

/// Cursor over an unwrapped description.
struct Lexer<'a> {
	/// The description as given, quoted in errors.
	description: &'a str,
	/// The unwrapped description.
	text: &'a [u8],
	/// Byte offset of the next unread character.
	position: usize,
}

impl Lexer<'_> {
	/// The next unread byte.
	fn peek(&self) -> Option<u8> {
		self.text.get(self.position).copied()
	}

	/// Build a lexing error at the current position.
	fn error(&self, message: &'static str) -> Error {
		Error::Lexing {
			position: self.position,
			message,
			snippet: self.description.chars().take(SNIPPET_LENGTH).collect(),
		}
	}

	/// Advance past spaces.
	fn skip_whitespace(&mut self) {
		while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
			self.position += 1;
		}
	}

	/// Read list elements up to and including the closing parenthesis. The
	/// opening parenthesis has already been consumed.
	fn list(&mut self, nested: bool) -> Result<Vec<Token>, Error> {
		let mut tokens = Vec::new();
		loop {
			self.skip_whitespace();
			match self.peek() {
				None => return Err(self.error("unbalanced parenthesis")),
				Some(b')') => {
					self.position += 1;
					return Ok(tokens);
				}
				Some(b'(') => {
					self.position += 1;
					tokens.push(Token::List(self.list(true)?));
				}
				Some(b'\'') => tokens.push(Token::Word(self.quoted()?)),
				Some(_) => {
					let word = self.bareword()?;
					if !(nested && word == "$") {
						tokens.push(Token::Word(word));
					}
				}
			}
		}
	}

	/// Read a single-quoted string, resolving `\27` and `\5c` escapes.
	fn quoted(&mut self) -> Result<String, Error> {
		let start = self.position + 1;
		let Some(length) = self.text[start..].iter().position(|b| *b == b'\'') else {
			return Err(self.error("unbalanced single quote"));
		};
		let quoted = String::from_utf8_lossy(&self.text[start..start + length]);
		self.position = start + length + 1;
		Ok(unescape(&quoted))
	}

	/// Read a word up to the next space or closing parenthesis.
	fn bareword(&mut self) -> Result<String, Error> {
		let start = self.position;
		let length = self.text[start..]
			.iter()
			.position(|b| b.is_ascii_whitespace() || *b == b')')
			.unwrap_or(self.text.len() - start);
		let word = &self.text[start..start + length];
		if word.iter().any(|b| matches!(b, b'\\' | b'\'')) {
			return Err(self.error("bareword contains backslash or quote"));
		}
		self.position = start + length;
		Ok(String::from_utf8_lossy(word).into_owned())
	}
}

/// Resolve the escapes allowed in quoted strings.
fn unescape(quoted: &str) -> String {
	let mut unescaped = String::with_capacity(quoted.len());
	let mut rest = quoted;
	while let Some(index) = rest.find('\\') {
		unescaped.push_str(&rest[..index]);
		let escape = &rest[index..];
		if let Some(tail) = escape.strip_prefix("\\5c").or_else(|| escape.strip_prefix("\\5C")) {
			unescaped.push('\\');
			rest = tail;
		} else if let Some(tail) = escape.strip_prefix("\\27") {
			unescaped.push('\'');
			rest = tail;
		} else {
			unescaped.push('\\');
			rest = &escape[1..];
		}
	}
	unescaped.push_str(rest);
	unescaped
}
