/// STL file parser for binary and ASCII formats
use std::path::Path;

use log::debug;
use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::{all_consuming, cut},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::LoadError;
use crate::geometry::{Mesh, Triangle};

const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;
const MIN_BINARY_LEN: usize = HEADER_LEN + 4;

/// Read and parse an STL file from disk
///
/// The whole file is read up front, so the handle is closed before parsing starts.
pub fn load_stl(path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", data.len(), path.display());

    parse_stl(&data)
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    let mut ascii_error = None;

    if looks_like_ascii(data) {
        let parsed = std::str::from_utf8(data)
            .map_err(|e| LoadError::Ascii(e.to_string()))
            .and_then(parse_ascii_stl);
        match parsed {
            Ok(mesh) => return Ok(mesh),
            Err(e) => {
                debug!("ASCII STL parse failed ({e}), retrying as binary");
                ascii_error = Some(e);
            }
        }
    }

    // A file that announced itself as ASCII reports the ASCII error
    parse_binary_stl(data).map_err(|e| ascii_error.unwrap_or(e))
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, LoadError> {
    if data.len() < MIN_BINARY_LEN {
        return Err(LoadError::TooSmall(data.len()));
    }

    let (records, triangle_count) =
        binary_header(data).map_err(|_| LoadError::TooSmall(data.len()))?;
    let triangle_count = triangle_count as usize;

    let expected = triangle_count
        .saturating_mul(RECORD_LEN)
        .saturating_add(MIN_BINARY_LEN);
    if data.len() < expected {
        return Err(LoadError::Truncated {
            expected,
            found: data.len(),
        });
    }

    let (_, triangles) =
        count(binary_facet, triangle_count)(records).map_err(|_| LoadError::Truncated {
            expected,
            found: data.len(),
        })?;

    finish(triangles)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, LoadError> {
    match all_consuming(ascii_solid)(input) {
        Ok((_, triangles)) => finish(triangles),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(LoadError::Ascii(describe_position(input, e.input)))
        }
        Err(nom::Err::Incomplete(_)) => Err(LoadError::Ascii("incomplete input".to_string())),
    }
}

/// Serialize a mesh as binary STL
pub fn write_binary_stl(mesh: &Mesh) -> Vec<u8> {
    let mut out = Vec::with_capacity(MIN_BINARY_LEN + mesh.triangle_count() * RECORD_LEN);

    let mut header = [0u8; HEADER_LEN];
    let label = b"binary STL written by stlview";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(mesh.triangle_count() as u32).to_le_bytes());

    for triangle in &mesh.triangles {
        let coords = triangle
            .normal
            .iter()
            .chain(triangle.vertices.iter().flat_map(|v| v.coords.iter()));
        for c in coords {
            out.extend_from_slice(&c.to_le_bytes());
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }

    out
}

fn finish(triangles: Vec<Triangle>) -> Result<Mesh, LoadError> {
    if let Some(index) = triangles.iter().position(|t| !t.is_finite()) {
        return Err(LoadError::NonFinite(index));
    }
    debug!("parsed {} triangles", triangles.len());
    Ok(Mesh { triangles })
}

fn looks_like_ascii(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());

    // Some binary exporters also begin their header with "solid"
    data[start..].starts_with(b"solid") && !binary_size_matches(data)
}

fn binary_size_matches(data: &[u8]) -> bool {
    match binary_header(data) {
        Ok((_, n)) => (n as usize)
            .checked_mul(RECORD_LEN)
            .and_then(|len| len.checked_add(MIN_BINARY_LEN))
            .is_some_and(|len| len == data.len()),
        Err(_) => false,
    }
}

fn describe_position(input: &str, rest: &str) -> String {
    let offset = input.len() - rest.len();
    let line = input[..offset].matches('\n').count() + 1;
    let snippet: String = rest.trim_start().chars().take(24).collect();
    if snippet.is_empty() {
        format!("unexpected end of input at line {line}")
    } else {
        format!("unexpected input at line {line}: {snippet:?}")
    }
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_LEN), le_u32)(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    let (input, normal) = binary_vector(input)?;
    let (input, v0) = binary_vector(input)?;
    let (input, v1) = binary_vector(input)?;
    let (input, v2) = binary_vector(input)?;
    // Attribute byte count, unused
    let (input, _) = le_u16(input)?;

    Ok((
        input,
        Triangle::new(
            Vector3::new(normal.0, normal.1, normal.2),
            Point3::new(v0.0, v0.1, v0.2),
            Point3::new(v1.0, v1.1, v1.2),
            Point3::new(v2.0, v2.1, v2.2),
        ),
    ))
}

fn binary_vector(input: &[u8]) -> IResult<&[u8], (f32, f32, f32)> {
    tuple((le_f32, le_f32, le_f32))(input)
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    let (input, _) = multispace0(input)?;

    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    // Past "facet" a mismatch is an error at that token, not the end of the facet list
    cut(ascii_facet_body)(input)
}

fn ascii_facet_body(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, (nx, ny, nz)) = ascii_vector(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v0) = ascii_vertex(input)?;
    let (input, v1) = ascii_vertex(input)?;
    let (input, v2) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(Vector3::new(nx, ny, nz), v0, v1, v2)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, (x, y, z)) = ascii_vector(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn ascii_vector(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_ASCII: &str = "solid part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1.5 0 0
      vertex 0 2e0 -0.25
    endloop
  endfacet
endsolid part
";

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        // Set triangle count to 0
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.triangles.len(), 0);
    }

    #[test]
    fn test_parse_binary_cube() {
        let cube = Mesh::cube(2.0);
        let data = write_binary_stl(&cube);
        assert_eq!(data.len(), 84 + 12 * 50);

        let parsed = parse_stl(&data).unwrap();
        assert_eq!(parsed, cube);
    }

    #[test]
    fn test_binary_too_small() {
        assert!(matches!(
            parse_binary_stl(&[0u8; 10]),
            Err(LoadError::TooSmall(10))
        ));
    }

    #[test]
    fn test_binary_truncated() {
        let mut data = write_binary_stl(&Mesh::cube(1.0));
        data.truncate(data.len() - 20);
        assert!(matches!(
            parse_binary_stl(&data),
            Err(LoadError::Truncated { expected: 684, found: 664 })
        ));
    }

    #[test]
    fn test_parse_ascii_named_solid() {
        let mesh = parse_stl(TRIANGLE_ASCII.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);

        let triangle = mesh.triangles[0];
        assert_eq!(triangle.normal, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(triangle.vertices[1], Point3::new(1.5, 0.0, 0.0));
        assert_eq!(triangle.vertices[2], Point3::new(0.0, 2.0, -0.25));
    }

    #[test]
    fn test_parse_ascii_reports_line() {
        let broken = TRIANGLE_ASCII.replace("vertex 1.5 0 0", "vertex 1.5 zero 0");
        match parse_stl(broken.as_bytes()) {
            Err(LoadError::Ascii(message)) => {
                assert!(message.contains("line 5"), "{message}");
                assert!(message.contains("zero"), "{message}");
            }
            other => panic!("expected ASCII error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ascii_reports_missing_endloop_line() {
        let broken = TRIANGLE_ASCII.replace("    endloop\n", "");
        match parse_ascii_stl(&broken) {
            Err(LoadError::Ascii(message)) => {
                assert!(message.contains("line 7"), "{message}");
                assert!(message.contains("endfacet"), "{message}");
            }
            other => panic!("expected ASCII error, got {other:?}"),
        }
    }

    #[test]
    fn test_binary_header_starting_with_solid() {
        let mut data = write_binary_stl(&Mesh::cube(1.0));
        data[..5].copy_from_slice(b"solid");

        let mesh = parse_stl(&data).unwrap();
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut mesh = Mesh::cube(1.0);
        mesh.triangles[3].vertices[0].x = f32::NAN;
        let data = write_binary_stl(&mesh);
        assert!(matches!(parse_stl(&data), Err(LoadError::NonFinite(3))));
    }
}
