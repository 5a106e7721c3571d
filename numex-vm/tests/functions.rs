use assert_float_eq::*;
use ndarray::{arr1, arr2, Array, ArrayD, IxDyn};
use num_complex::Complex64;
use numex_compiler::error::UnrecognizedOperator;
use numex_expr::{Expr, LazyBulkList, Symbol};
use numex_vm::{compile, compile_with, CompileOptions, Value};
use pretty_assertions::assert_eq;
use std::f64::consts::PI;

fn symbols(names: &[&str]) -> Vec<Symbol> {
    names.iter().map(|name| Symbol::global(name)).collect()
}

fn reals(value: Value) -> ArrayD<f64> {
    match value {
        Value::Real(a) => a,
        other => panic!("expected reals, got {:?}", other),
    }
}

fn complex_scalar(value: Value) -> Complex64 {
    match value {
        Value::Complex(a) if a.ndim() == 0 => a[[]],
        other => panic!("expected a complex scalar, got {:?}", other),
    }
}

#[test]
fn surface_scenario() {
    let expr = numex_parser::parse("Sin[(x^2 + y^2) freq] amp").unwrap();
    let f = compile(&expr, &symbols(&["x", "y", "freq", "amp"])).unwrap();

    let (n, m) = (31, 17);
    let x = ArrayD::from_shape_fn(IxDyn(&[n, m]), |idx| -2.0 + 4.0 * idx[0] as f64 / (n - 1) as f64);
    let y = ArrayD::from_shape_fn(IxDyn(&[n, m]), |idx| -1.0 + 4.0 * idx[1] as f64 / (m - 1) as f64);

    let out = reals(f.call(&[x.clone().into(), y.clone().into(), Value::from(1.5), Value::from(1.2)]).unwrap());
    assert_eq!(out.shape(), &[n, m]);
    for ((&out, &x), &y) in out.iter().zip(x.iter()).zip(y.iter()) {
        let expected = ((x * x + y * y) * 1.5).sin() * 1.2;
        assert_float_absolute_eq!(out, expected, 1e-9 * expected.abs() + 1e-15);
    }
}

#[test]
fn surface_over_broadcast_axes() {
    let expr = numex_parser::parse("Sin[(x^2 + y^2) freq] amp").unwrap();
    let f = compile(&expr, &symbols(&["x", "y", "freq", "amp"])).unwrap();

    let xs = Array::linspace(-2.0, 2.0, 41);
    let ys = Array::linspace(-1.0, 3.0, 21);
    let x = xs.clone().into_shape((41, 1)).unwrap().into_dyn();
    let y = ys.clone().into_shape((1, 21)).unwrap().into_dyn();

    let out = reals(f.call(&[x.into(), y.into(), Value::from(1.5), Value::from(0.25)]).unwrap());
    assert_eq!(out.shape(), &[41, 21]);
    for (i, &x) in xs.iter().enumerate() {
        for (j, &y) in ys.iter().enumerate() {
            let expected = ((x * x + y * y) * 1.5).sin() * 0.25;
            assert_float_absolute_eq!(out[[i, j]], expected, 1e-9 * expected.abs() + 1e-15);
        }
    }
}

#[test]
fn deterministic() {
    let expr = numex_parser::parse("Exp[-x^2] Cos[3 x] + Gamma[x + 1]").unwrap();
    let a = compile(&expr, &symbols(&["x"])).unwrap();
    let b = compile(&expr, &symbols(&["x"])).unwrap();
    assert_eq!(a.program().chunks, b.program().chunks);

    let xs = Value::from(Array::linspace(0.0, 4.0, 101).into_dyn());
    assert_eq!(a.call(&[xs.clone()]).unwrap(), a.call(&[xs.clone()]).unwrap());
    assert_eq!(a.call(&[xs.clone()]).unwrap(), b.call(&[xs]).unwrap());
}

#[test]
fn arc_tangent_by_arity() {
    let expr = numex_parser::parse("{ArcTan[x], ArcTan[x, y]}").unwrap();
    let f = compile(&expr, &symbols(&["x", "y"])).unwrap();
    let out = reals(f.call(&[Value::from(-1.0), Value::from(1.0)]).unwrap());
    assert_float_relative_eq!(out[0], -PI / 4.0, 1e-15);
    assert_float_relative_eq!(out[1], 3.0 * PI / 4.0, 1e-15);
}

#[test]
fn square_root_exponent() {
    let power = numex_parser::parse("x^(1/2)").unwrap();
    let sqrt = numex_parser::parse("Sqrt[x]").unwrap();
    let x = symbols(&["x"]);

    let f = compile(&power, &x).unwrap();
    let g = compile(&sqrt, &x).unwrap();
    let xs = Value::from(arr1(&[0.0, 0.25, 2.0, 9.0]).into_dyn());
    assert_eq!(f.call(&[xs.clone()]).unwrap(), g.call(&[xs]).unwrap());
    assert_eq!(f.call(&[Value::from(4.0)]).unwrap(), Value::from(2.0));
    assert!(f.call(&[Value::from(-1.0)]).unwrap().as_real_scalar().unwrap().is_nan());

    let f = compile_with(&power, &x, CompileOptions::complex()).unwrap();
    let root = complex_scalar(f.call(&[Value::from(-1.0)]).unwrap());
    assert_float_absolute_eq!(root.re, 0.0, 1e-15);
    assert_float_absolute_eq!(root.im, 1.0, 1e-15);
    let square = root * root;
    assert_float_absolute_eq!(square.re, -1.0, 1e-15);
    assert_float_absolute_eq!(square.im, 0.0, 1e-15);
}

#[test]
fn unknown_operator_fails_to_compile() {
    let expr = numex_parser::parse("Sin[x] + BesselJ[0, x]").unwrap();
    let err = compile(&expr, &symbols(&["x"])).unwrap_err();
    assert_eq!(err.downcast_ref::<UnrecognizedOperator>().unwrap().name, "BesselJ");
    assert!(err.to_string().contains("BesselJ"));

    let rendered = err.render("expr", &expr.to_string());
    let stripped = strip_ansi_escapes::strip_str(rendered);
    assert!(stripped.contains("unrecognized operator: `BesselJ`"));
    assert!(stripped.contains("this operator"));
}

#[test]
fn broadcast_shapes() {
    let expr = numex_parser::parse("x y + 1").unwrap();
    let f = compile(&expr, &symbols(&["x", "y"])).unwrap();
    let matrix = Value::from(arr2(&[[1.0, 2.0], [3.0, 4.0]]).into_dyn());

    // scalar and rank 2
    assert_eq!(
        f.call(&[Value::from(2.0), matrix.clone()]).unwrap(),
        Value::from(arr2(&[[3.0, 5.0], [7.0, 9.0]]).into_dyn()),
    );

    // rank 2 and rank 2
    assert_eq!(
        f.call(&[matrix.clone(), matrix]).unwrap(),
        Value::from(arr2(&[[2.0, 5.0], [10.0, 17.0]]).into_dyn()),
    );
}

#[test]
fn lists_stack_along_a_new_axis() {
    let expr = numex_parser::parse("{x, 2 x, 0}").unwrap();
    let f = compile(&expr, &symbols(&["x"])).unwrap();
    let out = f.call(&[Value::from(arr1(&[1.0, 2.0]).into_dyn())]).unwrap();
    assert_eq!(out, Value::from(arr2(&[[1.0, 2.0], [2.0, 4.0], [0.0, 0.0]]).into_dyn()));
}

#[test]
fn bulk_lists_are_constants() {
    let data = LazyBulkList::from_array(arr1(&[1i32, 2, 3]).into_dyn()).unwrap();
    let expr = Expr::call("Times", vec![Symbol::global("x").into(), Expr::Bulk(data.clone())]);
    let f = compile(&expr, &symbols(&["x"])).unwrap();

    assert_eq!(
        f.call(&[Value::from(0.5)]).unwrap(),
        Value::from(arr1(&[0.5, 1.0, 1.5]).into_dyn()),
    );
    assert!(!data.is_materialized());
}

#[test]
fn out_of_domain_values_are_not_errors() {
    let expr = numex_parser::parse("{Log[x], 1/x, ArcSin[x]}").unwrap();
    let f = compile(&expr, &symbols(&["x"])).unwrap();
    let out = reals(f.call(&[Value::from(0.0)]).unwrap());
    assert_eq!(out[0], f64::NEG_INFINITY);
    assert_eq!(out[1], f64::INFINITY);
    assert_eq!(out[2], 0.0);

    let out = reals(f.call(&[Value::from(-2.0)]).unwrap());
    assert!(out[0].is_nan());
    assert!(out[2].is_nan());
}

#[test]
fn concurrent_calls() {
    let expr = numex_parser::parse("Module[{s = 0}, Do[s += x^k, {k, 0, 5}]; s]").unwrap();
    let f = compile(&expr, &symbols(&["x"])).unwrap();

    std::thread::scope(|scope| {
        let handles = (0..8)
            .map(|i| {
                let f = f.clone();
                scope.spawn(move || f.call(&[Value::from(i as f64)]).unwrap())
            })
            .collect::<Vec<_>>();
        for (i, handle) in handles.into_iter().enumerate() {
            let x = i as f64;
            let expected = (0..=5).map(|k| x.powi(k)).sum::<f64>();
            assert_eq!(handle.join().unwrap(), Value::from(expected));
        }
    });
}

#[test]
fn shape_is_preserved() {
    let expr = numex_parser::parse("Abs[x] + 0 x").unwrap();
    let f = compile(&expr, &symbols(&["x"])).unwrap();
    let input = ArrayD::from_shape_fn(IxDyn(&[2, 3, 4]), |idx| idx[0] as f64 - idx[2] as f64);
    let out = reals(f.call(&[Value::from(input.clone())]).unwrap());
    assert_eq!(out.shape(), input.shape());
    assert_eq!(out, input.mapv(f64::abs));
}
