// Dweve MLS - MATLAB Code Intelligence
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Static tables of MATLAB built-in functions and language keywords.
//!
//! These back the completion and hover features for names that no open file
//! defines. The list covers the common core, not the full toolbox surface.

/// A built-in function name with a one-line description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub detail: &'static str,
}

/// Language keywords. These never resolve to symbols but are offered as
/// completion candidates.
pub const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "catch",
    "classdef",
    "continue",
    "else",
    "elseif",
    "end",
    "enumeration",
    "events",
    "for",
    "function",
    "global",
    "if",
    "import",
    "methods",
    "otherwise",
    "parfor",
    "persistent",
    "properties",
    "return",
    "switch",
    "try",
    "while",
];

/// Common built-in functions.
pub const BUILTIN_FUNCTIONS: &[Builtin] = &[
    // Elementary math
    Builtin { name: "abs", detail: "absolute value" },
    Builtin { name: "acos", detail: "inverse cosine" },
    Builtin { name: "asin", detail: "inverse sine" },
    Builtin { name: "atan", detail: "inverse tangent" },
    Builtin { name: "atan2", detail: "four-quadrant inverse tangent" },
    Builtin { name: "ceil", detail: "round toward positive infinity" },
    Builtin { name: "cos", detail: "cosine" },
    Builtin { name: "cosh", detail: "hyperbolic cosine" },
    Builtin { name: "exp", detail: "exponential" },
    Builtin { name: "factorial", detail: "factorial" },
    Builtin { name: "floor", detail: "round toward negative infinity" },
    Builtin { name: "gcd", detail: "greatest common divisor" },
    Builtin { name: "hypot", detail: "square root of sum of squares" },
    Builtin { name: "log", detail: "natural logarithm" },
    Builtin { name: "log10", detail: "base-10 logarithm" },
    Builtin { name: "log2", detail: "base-2 logarithm" },
    Builtin { name: "max", detail: "largest element" },
    Builtin { name: "min", detail: "smallest element" },
    Builtin { name: "mod", detail: "remainder after division" },
    Builtin { name: "prod", detail: "product of elements" },
    Builtin { name: "rem", detail: "remainder after division (toward zero)" },
    Builtin { name: "round", detail: "round to nearest integer" },
    Builtin { name: "sign", detail: "signum" },
    Builtin { name: "sin", detail: "sine" },
    Builtin { name: "sinh", detail: "hyperbolic sine" },
    Builtin { name: "sqrt", detail: "square root" },
    Builtin { name: "sum", detail: "sum of elements" },
    Builtin { name: "tan", detail: "tangent" },
    Builtin { name: "tanh", detail: "hyperbolic tangent" },
    // Array construction and shape
    Builtin { name: "cat", detail: "concatenate arrays" },
    Builtin { name: "circshift", detail: "shift array circularly" },
    Builtin { name: "eye", detail: "identity matrix" },
    Builtin { name: "find", detail: "indices of nonzero elements" },
    Builtin { name: "horzcat", detail: "horizontal concatenation" },
    Builtin { name: "length", detail: "length of largest array dimension" },
    Builtin { name: "linspace", detail: "linearly spaced vector" },
    Builtin { name: "logspace", detail: "logarithmically spaced vector" },
    Builtin { name: "meshgrid", detail: "2-D grid coordinates" },
    Builtin { name: "ndims", detail: "number of array dimensions" },
    Builtin { name: "numel", detail: "number of array elements" },
    Builtin { name: "ones", detail: "array of ones" },
    Builtin { name: "permute", detail: "rearrange array dimensions" },
    Builtin { name: "rand", detail: "uniformly distributed random numbers" },
    Builtin { name: "randn", detail: "normally distributed random numbers" },
    Builtin { name: "repmat", detail: "repeat array copies" },
    Builtin { name: "reshape", detail: "reshape array" },
    Builtin { name: "size", detail: "array dimensions" },
    Builtin { name: "squeeze", detail: "remove singleton dimensions" },
    Builtin { name: "vertcat", detail: "vertical concatenation" },
    Builtin { name: "zeros", detail: "array of zeros" },
    // Linear algebra and transforms
    Builtin { name: "chol", detail: "Cholesky factorization" },
    Builtin { name: "eig", detail: "eigenvalues and eigenvectors" },
    Builtin { name: "fft", detail: "fast Fourier transform" },
    Builtin { name: "ifft", detail: "inverse fast Fourier transform" },
    Builtin { name: "lu", detail: "LU factorization" },
    Builtin { name: "qr", detail: "QR factorization" },
    Builtin { name: "svd", detail: "singular value decomposition" },
    // Types and predicates
    Builtin { name: "cell", detail: "cell array" },
    Builtin { name: "char", detail: "character array" },
    Builtin { name: "double", detail: "double-precision array" },
    Builtin { name: "isa", detail: "class membership test" },
    Builtin { name: "ischar", detail: "true for character array" },
    Builtin { name: "isempty", detail: "true for empty array" },
    Builtin { name: "isfloat", detail: "true for floating-point array" },
    Builtin { name: "islogical", detail: "true for logical array" },
    Builtin { name: "isnumeric", detail: "true for numeric array" },
    Builtin { name: "logical", detail: "logical array" },
    Builtin { name: "single", detail: "single-precision array" },
    Builtin { name: "struct", detail: "structure array" },
    // Strings
    Builtin { name: "lower", detail: "convert to lowercase" },
    Builtin { name: "strcmp", detail: "compare strings" },
    Builtin { name: "strcmpi", detail: "compare strings, case-insensitive" },
    Builtin { name: "strfind", detail: "find substring" },
    Builtin { name: "strrep", detail: "replace substring" },
    Builtin { name: "upper", detail: "convert to uppercase" },
    // Reductions over logicals
    Builtin { name: "all", detail: "true if all elements are nonzero" },
    Builtin { name: "any", detail: "true if any element is nonzero" },
    Builtin { name: "cumprod", detail: "cumulative product" },
    Builtin { name: "cumsum", detail: "cumulative sum" },
    Builtin { name: "diff", detail: "differences between elements" },
    // Plotting
    Builtin { name: "axis", detail: "axis scaling and appearance" },
    Builtin { name: "figure", detail: "create figure window" },
    Builtin { name: "hold", detail: "retain current plot" },
    Builtin { name: "legend", detail: "add legend to axes" },
    Builtin { name: "plot", detail: "2-D line plot" },
    Builtin { name: "plot3", detail: "3-D line plot" },
    Builtin { name: "subplot", detail: "axes in tiled positions" },
    Builtin { name: "title", detail: "add title to axes" },
    Builtin { name: "xlabel", detail: "label x-axis" },
    Builtin { name: "ylabel", detail: "label y-axis" },
    // I/O and environment
    Builtin { name: "clear", detail: "remove variables from workspace" },
    Builtin { name: "close", detail: "close figure windows" },
    Builtin { name: "disp", detail: "display value" },
    Builtin { name: "error", detail: "throw error" },
    Builtin { name: "exist", detail: "check existence of name" },
    Builtin { name: "fclose", detail: "close file" },
    Builtin { name: "fopen", detail: "open file" },
    Builtin { name: "fprintf", detail: "formatted output" },
    Builtin { name: "fscanf", detail: "formatted input" },
    Builtin { name: "input", detail: "prompt for user input" },
    Builtin { name: "load", detail: "load variables from file" },
    Builtin { name: "num2str", detail: "number to string" },
    Builtin { name: "save", detail: "save variables to file" },
    Builtin { name: "sprintf", detail: "formatted string" },
    Builtin { name: "warning", detail: "issue warning" },
    Builtin { name: "which", detail: "locate function or file" },
    // Timing
    Builtin { name: "pause", detail: "suspend execution" },
    Builtin { name: "tic", detail: "start stopwatch" },
    Builtin { name: "toc", detail: "read stopwatch" },
];

/// True when `name` is a built-in function.
pub fn is_builtin(name: &str) -> bool {
    builtin_detail(name).is_some()
}

/// True when `name` is a language keyword.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Detail text for a built-in function, if `name` is one.
pub fn builtin_detail(name: &str) -> Option<&'static str> {
    BUILTIN_FUNCTIONS
        .iter()
        .find(|b| b.name == name)
        .map(|b| b.detail)
}
