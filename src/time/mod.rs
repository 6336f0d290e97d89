pub(crate) mod algebra;
