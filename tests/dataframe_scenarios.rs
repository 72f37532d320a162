//! End-to-end frame scenarios: build, infer, transform, read back

use tabkit::{
    dataframe_of, values, Column, DataFrame, DataType, Dimension, Error, LinearRegression,
    LinearRegressionConfig, MatrixLike, Model, Value,
};

fn people() -> DataFrame {
    dataframe_of(&["name", "birthYear"])
        .build(values!["john", 1979, "jane", 1992])
        .unwrap()
}

#[test]
fn test_age_from_birth_year() {
    let df = people();
    assert_eq!(df.column("name").unwrap().dtype(), DataType::UTF8);
    assert_eq!(df.column("birthYear").unwrap().dtype(), DataType::INT32);

    let age = df
        .column("birthYear")
        .unwrap()
        .cast::<i32>()
        .unwrap()
        .map(DataType::INT32, |year| year.map(|y| 2018 - y))
        .unwrap()
        .alias("age");
    let df = df.cbind(age).unwrap();

    let ages = df.column("age").unwrap().cast::<i32>().unwrap().to_vec();
    assert_eq!(ages, vec![Some(39), Some(26)]);
    assert_eq!(df.dim(), Dimension::new(2, 3));
}

#[test]
fn test_nullable_inference_and_row_reads() {
    let df = dataframe_of(&["c1", "c2", "c3"])
        .build(values![
            10, 1.0, 0i64,
            Value::Null, 2.0, 1i64,
            11, Value::Null, Value::Null
        ])
        .unwrap();

    assert_eq!(df.column("c1").unwrap().dtype(), DataType::INT32.nullable_of());
    assert_eq!(df.column("c2").unwrap().dtype(), DataType::FLOAT64.nullable_of());
    assert_eq!(df.column("c3").unwrap().dtype(), DataType::INT64.nullable_of());

    assert_eq!(df.row(1).unwrap().get_int("c1").unwrap(), None);
    assert_eq!(df.row(2).unwrap().get_double("c2").unwrap(), None);
    assert_eq!(df.row(2).unwrap().get_int("c1").unwrap(), Some(11));
}

#[test]
fn test_extreme_values_are_not_absent() {
    let df = dataframe_of(&["a", "b", "c"])
        .build(values![i32::MIN, i64::MIN, f64::NAN])
        .unwrap();
    let row = df.row(0).unwrap();
    assert_eq!(row.get_int("a").unwrap(), Some(i32::MIN));
    assert_eq!(row.get_long("b").unwrap(), Some(i64::MIN));
    assert!(row.get_double("c").unwrap().is_some_and(f64::is_nan));
    assert_eq!(df.column("a").unwrap().dtype(), DataType::INT32);
}

#[test]
fn test_filter_row_correspondence() {
    let df = dataframe_of(&["k", "v"])
        .build(values![5, "a", 1, "b", 7, "c", 3, "d", 9, "e"])
        .unwrap();
    let pred = |k: Option<i32>| k.is_some_and(|k| k > 4);
    let out = df.filter::<i32>("k", pred).unwrap();

    let matching: Vec<usize> = df
        .column("k")
        .unwrap()
        .cast::<i32>()
        .unwrap()
        .iter()
        .enumerate()
        .filter(|(_, k)| pred(*k))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(out.nrows(), matching.len());
    for (k, &j) in matching.iter().enumerate() {
        assert_eq!(out.row(k).unwrap(), df.row(j).unwrap());
    }
}

#[test]
fn test_cbind_then_drop_is_identity() {
    let df = people();
    let extra = DataFrame::new(vec![
        Column::new("x", vec![1.0, 2.0]),
        Column::nullable("y", vec![Some(1i64), None]),
    ])
    .unwrap();
    let back = df.cbind_frame(&extra).unwrap().drop("x").drop("y");
    assert_eq!(back.header(), df.header());
    for (a, b) in back.columns().iter().zip(df.columns()) {
        assert!(a.shares_storage_with(b));
    }
}

#[test]
fn test_error_conditions() {
    assert!(matches!(
        dataframe_of(&["a", "b"]).build(values![1, 2, 3]),
        Err(Error::RaggedInput { .. })
    ));
    let df = people();
    assert!(matches!(df.column("nope"), Err(Error::NoSuchColumn { .. })));
    assert!(matches!(
        df.column("name").unwrap().cast::<i32>(),
        Err(Error::TypeMismatch { .. })
    ));
    assert!(matches!(
        df.cbind(Column::new("z", vec![1, 2, 3])),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(matches!(
        df.column("birthYear").unwrap().map(DataType::INT32, |_| "x"),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn test_failed_map_into_nullable_target_is_absent() {
    let df = people();
    let col = df
        .column("name")
        .unwrap()
        .map(DataType::INT32.nullable_of(), |v| match v.as_str() {
            Some("john") => Value::Int32(1),
            _ => Value::from("unknown"),
        })
        .unwrap();
    assert_eq!(col.get(0).unwrap(), Value::Int32(1));
    assert!(col.is_null(1).unwrap());
}

#[test]
fn test_frame_to_model() {
    let df = dataframe_of(&["x", "y"])
        .build(values![0.0, 1.0, 0.5, 2.0, 1.0, 3.0])
        .unwrap();
    let features = df.select(&["x"]).unwrap();
    let m = features.to_matrix().unwrap();
    assert_eq!(m.dim(), Dimension::new(3, 1));

    let mut model = LinearRegression::new(LinearRegressionConfig {
        max_iter: 10_000,
        learning_rate: 0.5,
        tolerance: 1e-10,
        fit_intercept: true,
    });
    model.fit(&features, df.column("y").unwrap()).unwrap();
    let pred = model.predict(&features).unwrap();
    let pred = pred.cast::<f64>().unwrap();
    for (p, y) in pred.iter().zip([1.0, 2.0, 3.0]) {
        approx::assert_abs_diff_eq!(p.unwrap(), y, epsilon = 1e-5);
    }
}
